pub mod stop_event;
