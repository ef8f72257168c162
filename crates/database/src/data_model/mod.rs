pub mod marker;
pub mod parking;
