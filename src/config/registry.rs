use super::{Field, FieldOption, FieldType, NodeConfig, OutputType, SectionType};
use ahash::AHashMap;

/// Lookup table from processor type to its authoritative [`NodeConfig`].
///
/// The registry is an ordinary value: build one at startup and hand it to the
/// importer, or build a small one in tests.
///
/// ```
/// use aiflow::config::{ConfigRegistry, NodeConfig};
///
/// let registry = ConfigRegistry::with_defaults()
///     .with_config("my-processor", NodeConfig::new("MyProcessor"));
/// assert!(registry.get("llm-prompt").is_some());
/// assert!(registry.get("my-processor").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: AHashMap<String, NodeConfig>,
}

impl ConfigRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in processor configurations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_default_configs(&mut registry);
        registry
    }

    pub fn with_config(mut self, processor_type: &str, config: NodeConfig) -> Self {
        self.insert(processor_type, config);
        self
    }

    pub fn insert(&mut self, processor_type: &str, config: NodeConfig) -> Option<NodeConfig> {
        self.configs.insert(processor_type.to_string(), config)
    }

    pub fn get(&self, processor_type: &str) -> Option<&NodeConfig> {
        self.configs.get(processor_type)
    }

    pub fn contains(&self, processor_type: &str) -> bool {
        self.configs.contains_key(processor_type)
    }

    /// Adds extension configurations keyed by their own `processorType`.
    ///
    /// Configurations without a processor type, or whose type is already registered,
    /// are skipped. Returns the number of configurations added.
    pub fn extend<I>(&mut self, extensions: I) -> usize
    where
        I: IntoIterator<Item = NodeConfig>,
    {
        let mut added = 0;
        for extension in extensions {
            let Some(key) = extension.processor_type.clone() else {
                tracing::debug!(node_name = %extension.node_name, "skipping extension without processor type");
                continue;
            };
            if self.configs.contains_key(&key) {
                continue;
            }
            self.configs.insert(key, extension);
            added += 1;
        }
        added
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

fn register_default_configs(registry: &mut ConfigRegistry) {
    registry.insert(
        "input-text",
        NodeConfig::new("Text")
            .with_processor_type("input-text")
            .with_field(
                Field::new("inputText", FieldType::Textarea)
                    .required()
                    .with_placeholder("InputPlaceholder"),
            )
            .with_output_type(OutputType::Text)
            .with_section(SectionType::Input),
    );

    registry.insert(
        "url_input",
        NodeConfig::new("EnterURL")
            .with_processor_type("url_input")
            .with_field(
                Field::new("url", FieldType::Input)
                    .required()
                    .with_placeholder("URLPlaceholder"),
            )
            .with_output_type(OutputType::Text)
            .with_section(SectionType::Input),
    );

    registry.insert(
        "llm-prompt",
        NodeConfig::new("LLMPrompt")
            .with_processor_type("llm-prompt")
            .with_input_names(&["initData"])
            .with_field(Field::new("model", FieldType::Option).with_options(vec![
                option("GPT3.5", "gpt-3.5-turbo-1106", true),
                option("GPT4", "gpt-4", false),
                option("GPT4-T", "gpt-4-1106-preview", false),
            ]))
            .with_field(
                Field::new("prompt", FieldType::Textarea)
                    .required()
                    .with_placeholder("PromptPlaceholder"),
            )
            .with_output_type(OutputType::Text)
            .with_section(SectionType::Models),
    );

    registry.insert(
        "merger-prompt",
        NodeConfig::new("MergerNode")
            .with_processor_type("merger-prompt")
            .with_input_names(&["input-1", "input-2"])
            .with_field(Field::new("mergeMode", FieldType::Option).with_options(vec![
                option("Merge", "1", false),
                option("Merge + GPT", "2", true),
            ]))
            .with_field(Field::new("inputNameBar", FieldType::InputNameBar))
            .with_field(
                Field::new("prompt", FieldType::Textarea)
                    .required()
                    .with_placeholder("PromptPlaceholder"),
            )
            .with_output_type(OutputType::Text)
            .with_section(SectionType::Tools),
    );
}

fn option(label: &str, value: &str, default: bool) -> FieldOption {
    FieldOption {
        label: label.to_string(),
        value: value.to_string(),
        default,
    }
}
