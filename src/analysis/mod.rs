pub mod csv;
pub mod family;
pub mod lifecycle;
pub mod matching;
pub mod openapi;
pub mod pcm_mapping;
pub mod validation;
