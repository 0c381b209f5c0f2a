pub mod books;

use shelf_kernel::ModuleRegistry;
use shelf_store::BookStore;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: BookStore) {
    registry.register(books::create_module(store));
}
