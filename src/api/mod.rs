pub mod attendance;
pub mod chef;
pub mod notification;
