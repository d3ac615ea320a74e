mod dependency_graph_spec_builder;
mod item_deduplicator;
mod package_spec_assembler;
mod reference_extractor;
mod settings_resolver;
mod target_framework_resolver;

pub use dependency_graph_spec_builder::DependencyGraphSpecBuilder;
pub use item_deduplicator::ItemDeduplicator;
pub use package_spec_assembler::{Assembled, PackageSpecAssembler, SkipReason};
pub use reference_extractor::ReferenceExtractor;
pub use settings_resolver::{EffectiveSettings, SettingsResolver, CLEAR_KEYWORD};
pub use target_framework_resolver::{FrameworkViews, TargetFrameworkResolver};
