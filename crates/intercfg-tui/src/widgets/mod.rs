//! Reusable widgets shared by the screens.

pub mod form;
pub mod hints;
pub mod line_input;
pub mod option_list;
pub mod pager;
pub mod popup;
pub mod selection;
pub mod sub_tabs;
