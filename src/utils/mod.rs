pub mod form;
pub mod html;
pub mod time;
pub mod validator;
