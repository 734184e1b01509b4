pub mod activities;
pub mod books;
pub mod health;
pub mod stats;

use std::sync::Arc;

use gridwatch_db::ActivityStore;
use gridwatch_kernel::ModuleRegistry;

/// Register every resource module, in startup order
pub fn register_all(
    registry: &mut ModuleRegistry,
    activity_store: Arc<dyn ActivityStore>,
) -> anyhow::Result<()> {
    registry.register(health::create_module())?;
    registry.register(books::create_module())?;
    registry.register(activities::create_module(activity_store))?;
    registry.register(stats::create_module())?;
    Ok(())
}
