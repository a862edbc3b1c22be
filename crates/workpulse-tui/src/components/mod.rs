pub mod task_board;
pub mod timer_widget;
