pub mod dispatcher;
pub mod lifecycle;
pub mod push;
pub mod sms;
