pub mod driver_handler;
