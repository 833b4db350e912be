pub mod books;
pub mod users;

use shelf_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(users::create_module());
    registry.register(books::create_module());
}

/// A registry holding every application module
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry);
    registry
}
