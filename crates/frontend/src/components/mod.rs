pub mod category_selector;
pub mod map_widget;
pub mod popup_panel;
