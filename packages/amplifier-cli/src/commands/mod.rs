pub mod run;
pub mod unrepost;
