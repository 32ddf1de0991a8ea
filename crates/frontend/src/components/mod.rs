pub mod children_editor;
pub mod confirm_panel;
pub mod layer_toggles;
pub mod map_view;
pub mod overlay_style;
