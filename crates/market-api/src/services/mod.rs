pub mod media_registry;
