pub mod booking_form;
pub mod pitch_map;
