mod bus;
mod cache;
