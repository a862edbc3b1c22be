use serde::{Deserialize, Serialize};

use crate::task::UserRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manager: Option<UserRef>,
    #[serde(default)]
    pub employee_count: u32,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit)) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_counts() {
        let page: Page<Department> = Page {
            items: Vec::new(),
            total: 21,
            page: 2,
            limit: 10,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let empty: Page<Department> = Page {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 0,
        };
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
    }
}
