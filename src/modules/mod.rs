pub mod authors;
pub mod books;

use bookshelf_db::SharedStore;
use bookshelf_kernel::ModuleRegistry;

/// Register every resource module, each holding a handle to the same store
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore) {
    registry.register(books::create_module(store.clone()));
    registry.register(authors::create_module(store));
}
