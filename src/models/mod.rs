pub mod contract;
pub mod lifecycle;
pub mod pcm;
pub mod report;
pub mod settings;
pub mod transfer;
