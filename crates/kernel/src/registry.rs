use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Migration, Module};

/// Core modules, in the order they come up. Shutdown runs in reverse.
const CORE_MODULE_ORDER: &[&str] = &[
    "db", // Connection pool; everything else persists through it
];

/// Module registry for managing module lifecycle with core/custom separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register an infrastructure module (see `CORE_MODULE_ORDER`)
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    /// Register an application module; these are mounted as HTTP routes
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// All registered modules, core first
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.ordered_core()
            .chain(self.custom_modules.iter())
            .collect()
    }

    /// Application modules in registration order
    pub fn custom_modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.custom_modules.iter()
    }

    /// Core modules in `CORE_MODULE_ORDER`, then any unlisted core modules
    /// in registration order.
    fn ordered_core(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        let listed = CORE_MODULE_ORDER.iter().filter_map(|&name| {
            self.core_modules.iter().find(|module| module.name() == name)
        });
        let unlisted = self
            .core_modules
            .iter()
            .filter(|module| !CORE_MODULE_ORDER.contains(&module.name()));
        listed.chain(unlisted)
    }

    /// Initialize core modules in order, then custom modules
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "initializing module");
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Start core modules in order, then custom modules
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "starting module");
            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Stop custom modules in reverse registration order, then core modules
    /// in reverse of `CORE_MODULE_ORDER`
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        for module in self.modules().into_iter().rev() {
            tracing::info!(module = module.name(), "stopping module");
            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Collect all migrations from all modules (core + custom)
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<(String, Migration)> = self
            .modules()
            .into_iter()
            .flat_map(|module| {
                let name = module.name().to_string();
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (name.clone(), migration))
            })
            .collect();

        // Sort by module name and migration ID for deterministic ordering
        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));

        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::sync::Mutex;

    struct TestModule {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl TestModule {
        fn new(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                journal: Arc::clone(journal),
            })
        }

        fn record(&self, event: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{event}:{}", self.name));
        }
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("init");
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.record("stop");
            Ok(())
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX idx ON t(a);",
                },
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE t (a INTEGER);",
                },
            ]
        }
    }

    #[test]
    fn empty_registry_has_no_modules_or_migrations() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn migrations_are_sorted_by_module_then_id() {
        let journal = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_custom(TestModule::new("books", &journal));
        registry.register_custom(TestModule::new("auth", &journal));

        let order: Vec<(String, &str)> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| (module, migration.id))
            .collect();

        assert_eq!(
            order,
            vec![
                ("auth".to_string(), "001_init"),
                ("auth".to_string(), "002_index"),
                ("books".to_string(), "001_init"),
                ("books".to_string(), "002_index"),
            ]
        );
    }

    #[test]
    fn unlisted_core_modules_follow_listed_ones() {
        let journal = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_custom(TestModule::new("books", &journal));
        registry.register_core(TestModule::new("cache", &journal));
        registry.register_core(TestModule::new("db", &journal));

        let names: Vec<&str> = registry.modules().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["db", "cache", "books"]);
        assert!(registry
            .collect_migrations()
            .iter()
            .any(|(module, _)| module == "cache"));
    }

    #[tokio::test]
    async fn lifecycle_runs_core_first_and_stops_in_reverse() {
        let journal: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_custom(TestModule::new("auth", &journal));
        registry.register_custom(TestModule::new("books", &journal));
        registry.register_core(TestModule::new("db", &journal));

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "init:db",
                "init:auth",
                "init:books",
                "stop:books",
                "stop:auth",
                "stop:db",
            ]
        );
    }
}
