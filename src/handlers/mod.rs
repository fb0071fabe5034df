pub mod api;

#[cfg(test)]
mod api_test;
