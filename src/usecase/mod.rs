pub mod register_driver_usecase;
