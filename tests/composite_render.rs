use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use mosaico::application::render::{
    ModuleRenderer, RenderConfig, RenderCoordinator, RenderError, RendererMap, RendererRegistry,
    StaticComposites, assemble,
};
use mosaico::domain::composites::{Composite, ContentModule};

/// Renders `<b>{module id}</b>`, optionally sleeping first for the number of
/// milliseconds found in the module's `delay_ms` property.
struct BannerRenderer;

#[async_trait]
impl ModuleRenderer for BannerRenderer {
    async fn render(&self, module: &ContentModule) -> Result<Option<String>, RenderError> {
        if let Some(delay_ms) = module.properties.get("delay_ms").and_then(|v| v.as_u64()) {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        Ok(Some(format!("<b>{}</b>", module.id)))
    }
}

struct FailingRenderer;

#[async_trait]
impl ModuleRenderer for FailingRenderer {
    async fn render(&self, _module: &ContentModule) -> Result<Option<String>, RenderError> {
        Err(RenderError::renderer("upstream data missing"))
    }
}

struct EmptyRenderer;

#[async_trait]
impl ModuleRenderer for EmptyRenderer {
    async fn render(&self, _module: &ContentModule) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}

struct PanickingRenderer;

#[async_trait]
impl ModuleRenderer for PanickingRenderer {
    async fn render(&self, _module: &ContentModule) -> Result<Option<String>, RenderError> {
        panic!("renderer bug");
    }
}

/// Registry wrapper that counts lookups, to prove the empty-input path never
/// consults the registry.
struct CountingRegistry {
    inner: RendererMap,
    lookups: AtomicUsize,
}

impl RendererRegistry for CountingRegistry {
    fn renderer_for(&self, type_tag: &str) -> Option<Arc<dyn ModuleRenderer>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.renderer_for(type_tag)
    }
}

fn banner_registry() -> Arc<RendererMap> {
    Arc::new(RendererMap::new().with("banner", Arc::new(BannerRenderer)))
}

fn banner_module() -> ContentModule {
    ContentModule::new("banner")
}

#[tokio::test]
async fn scenario_unknown_module_type_is_omitted_in_place() {
    let coordinator = RenderCoordinator::new(banner_registry());

    let a = banner_module();
    let b = ContentModule::new("unknown");
    let c = banner_module();
    let expected = format!("<b>{}</b><b>{}</b>", a.id, c.id);

    let modules = vec![a, b, c];
    let fragments = coordinator.render_modules("hero", &modules).await;

    assert_eq!(fragments.len(), 2);
    assert_eq!(assemble(&fragments), expected);
}

#[tokio::test(start_paused = true)]
async fn order_matches_input_despite_reversed_completion() {
    let coordinator = RenderCoordinator::new(banner_registry());

    // The first module sleeps longest, so completion order is the reverse of
    // the declared order.
    let modules: Vec<ContentModule> = (0..12)
        .map(|idx| {
            banner_module().with_properties(json!({ "delay_ms": (12 - idx) * 50 }))
        })
        .collect();
    let expected_ids: Vec<Uuid> = modules.iter().map(|m| m.id).collect();

    let fragments = coordinator.render_modules("hero", &modules).await;

    let got_ids: Vec<Uuid> = fragments.iter().map(|f| f.module_id).collect();
    assert_eq!(got_ids, expected_ids);
}

#[tokio::test]
async fn failed_and_empty_modules_shrink_output_silently() {
    let registry = Arc::new(
        RendererMap::new()
            .with("banner", Arc::new(BannerRenderer))
            .with("broken", Arc::new(FailingRenderer))
            .with("blank", Arc::new(EmptyRenderer)),
    );
    let coordinator = RenderCoordinator::new(registry);

    let modules = vec![
        banner_module(),
        ContentModule::new("broken"),
        banner_module(),
        ContentModule::new("blank"),
        banner_module(),
    ];
    let broken_id = modules[1].id;
    let blank_id = modules[3].id;

    let fragments = coordinator.render_modules("hero", &modules).await;

    assert_eq!(fragments.len(), 3);
    assert!(fragments.iter().all(|f| f.module_id != broken_id));
    assert!(fragments.iter().all(|f| f.module_id != blank_id));
}

#[tokio::test]
async fn panicking_renderer_does_not_break_siblings() {
    let registry = Arc::new(
        RendererMap::new()
            .with("banner", Arc::new(BannerRenderer))
            .with("buggy", Arc::new(PanickingRenderer)),
    );
    let coordinator = RenderCoordinator::new(registry);

    let modules = vec![banner_module(), ContentModule::new("buggy"), banner_module()];
    let expected_ids = vec![modules[0].id, modules[2].id];

    let fragments = coordinator.render_modules("hero", &modules).await;

    let got_ids: Vec<Uuid> = fragments.iter().map(|f| f.module_id).collect();
    assert_eq!(got_ids, expected_ids);
}

#[tokio::test]
async fn empty_module_list_skips_dispatch_and_lookups() {
    let registry = Arc::new(CountingRegistry {
        inner: RendererMap::new().with("banner", Arc::new(BannerRenderer)),
        lookups: AtomicUsize::new(0),
    });
    let coordinator = RenderCoordinator::new(Arc::clone(&registry) as Arc<dyn RendererRegistry>);

    let fragments = coordinator.render_modules("hero", &[]).await;

    assert!(fragments.is_empty());
    assert_eq!(registry.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_composite_name_renders_nothing() {
    let resolver = StaticComposites::new();
    let coordinator = RenderCoordinator::new(banner_registry());

    let output = coordinator.render_composite(&resolver, "sidebar").await;

    assert_eq!(output.html, "");
    assert_eq!(output.rendered, 0);
    assert_eq!(output.omitted, 0);
}

#[tokio::test]
async fn composite_resolution_ignores_name_case() {
    let mut resolver = StaticComposites::new();
    let module = banner_module();
    let expected = format!("<b>{}</b>", module.id);
    resolver
        .insert(Composite::new("Hero Modules").with_module(module))
        .unwrap();

    let coordinator = RenderCoordinator::new(banner_registry());
    let output = coordinator.render_composite(&resolver, "hero modules").await;

    assert_eq!(output.html, expected);
    assert_eq!(output.rendered, 1);
}

#[tokio::test(start_paused = true)]
async fn slow_module_is_omitted_when_timeout_is_configured() {
    let coordinator = RenderCoordinator::with_config(
        banner_registry(),
        RenderConfig {
            module_timeout_ms: Some(100),
        },
    );

    let fast = banner_module().with_properties(json!({ "delay_ms": 10 }));
    let slow = banner_module().with_properties(json!({ "delay_ms": 5_000 }));
    let fast_id = fast.id;

    let fragments = coordinator.render_modules("hero", &[fast, slow]).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].module_id, fast_id);
}

#[tokio::test(start_paused = true)]
async fn default_config_waits_for_slow_modules() {
    let coordinator = RenderCoordinator::new(banner_registry());

    let slow = banner_module().with_properties(json!({ "delay_ms": 60_000 }));
    let slow_id = slow.id;

    let fragments = coordinator.render_modules("hero", &[slow]).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].module_id, slow_id);
}

/// A renderer that owns a coordinator of its own and renders a nested
/// composite. Exercises the re-entrancy contract: nested renders share no
/// mutable state with their siblings.
struct NestedCompositeRenderer {
    inner: RenderCoordinator,
    modules: Vec<ContentModule>,
}

#[async_trait]
impl ModuleRenderer for NestedCompositeRenderer {
    async fn render(&self, _module: &ContentModule) -> Result<Option<String>, RenderError> {
        let fragments = self.inner.render_modules("nested", &self.modules).await;
        Ok(Some(format!("<section>{}</section>", assemble(&fragments))))
    }
}

#[tokio::test]
async fn nested_composites_render_within_a_parent_render() {
    let inner_modules = vec![banner_module(), banner_module()];
    let inner_html = format!(
        "<b>{}</b><b>{}</b>",
        inner_modules[0].id, inner_modules[1].id
    );

    let registry = Arc::new(
        RendererMap::new()
            .with("banner", Arc::new(BannerRenderer))
            .with(
                "container",
                Arc::new(NestedCompositeRenderer {
                    inner: RenderCoordinator::new(banner_registry()),
                    modules: inner_modules,
                }),
            ),
    );
    let coordinator = RenderCoordinator::new(registry);

    let leading = banner_module();
    let nested = ContentModule::new("container");
    let expected = format!("<b>{}</b><section>{inner_html}</section>", leading.id);

    let fragments = coordinator.render_modules("page", &[leading, nested]).await;

    assert_eq!(assemble(&fragments), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn soak_many_modules_keep_exact_identities_and_order() {
    let registry = Arc::new(
        RendererMap::new()
            .with("banner", Arc::new(BannerRenderer))
            .with("broken", Arc::new(FailingRenderer)),
    );
    let coordinator = RenderCoordinator::new(registry);

    for _iteration in 0..25 {
        let modules: Vec<ContentModule> = (0..1_000)
            .map(|idx| {
                if idx % 13 == 0 {
                    ContentModule::new("broken")
                } else {
                    // Staggered sleeps shuffle completion order across runs.
                    banner_module().with_properties(json!({ "delay_ms": (idx * 7) % 20 }))
                }
            })
            .collect();

        let expected_ids: Vec<Uuid> = modules
            .iter()
            .enumerate()
            .filter(|(idx, _)| idx % 13 != 0)
            .map(|(_, m)| m.id)
            .collect();

        let fragments = coordinator.render_modules("soak", &modules).await;

        let got_ids: Vec<Uuid> = fragments.iter().map(|f| f.module_id).collect();
        assert_eq!(got_ids, expected_ids);
    }
}
