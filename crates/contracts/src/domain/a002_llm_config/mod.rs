pub mod aggregate;
pub mod form;
pub mod sanitizer;
pub mod tool_form;
pub mod tools;
