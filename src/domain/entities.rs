pub mod award;
pub mod blog;
pub mod certification;
pub mod comment;
pub mod education;
pub mod experience;
pub mod message;
pub mod option_fields;
pub mod pagination;
pub mod project;
pub mod service;
pub mod site;
pub mod skill;
pub mod testimonial;
pub mod token;
pub mod user;
