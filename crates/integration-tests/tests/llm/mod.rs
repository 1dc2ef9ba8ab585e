mod ask;
mod errors;
mod models;
