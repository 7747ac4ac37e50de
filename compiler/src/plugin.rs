use prost::Message;
use prost_types::compiler::{
    code_generator_response::{Feature, File},
    CodeGeneratorRequest, CodeGeneratorResponse,
};
use protoboil_ir::{init_logging, Config, LogMode, Params};
use tracing::info;

use crate::{
    catalog::{Catalog, Catalogs, DirectoryCatalog, Registry},
    error::BoilError,
    gen_deps::DepsGenerator,
    gen_proto::ProtoGenerator,
    orchestrator::{Batch, Failure, Orchestrator},
    translator::translate,
};

/// Generators shipped with the plugin, addressed as `builtin/<name>`.
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register("builtin/proto_to.proto.gen", ProtoGenerator)
        .register("builtin/deps.json.gen", DepsGenerator);
    registry
}

/// Built-in generators first, then executables under the configured `PATH`.
pub fn default_catalog(config: &Config) -> Catalogs {
    Catalogs::new()
        .with(builtin_registry())
        .with(DirectoryCatalog::new(config.path.clone()))
}

/// Turns the request parameter string into the active configuration.
pub fn configure(parameter: &str) -> Result<Config, BoilError> {
    let params = Params::parse(parameter)?;
    let config = match params.config() {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    Ok(config)
}

/// Builds the plugin response out of a finished batch.
pub fn response(batch: Batch) -> (CodeGeneratorResponse, Vec<Failure>) {
    let file = batch
        .artifacts
        .into_iter()
        .map(|artifact| File {
            name:    Some(artifact.name),
            content: Some(artifact.content),
            ..Default::default()
        })
        .collect();

    let response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        file,
        ..Default::default()
    };
    (response, batch.failures)
}

/// Translates the request, saves the snapshot and runs the configured
/// generators against it.
pub fn generate(request: &CodeGeneratorRequest, config: Config, catalog: &dyn Catalog) -> Result<Batch, BoilError> {
    let ir = translate(&request.proto_file, config);
    let snapshot = ir.config().snapshot_path();
    ir.save(&snapshot)?;

    Orchestrator::new(catalog).run(&ir.config().template_list, &snapshot)
}

/// Output of a plugin run: the encoded response and the generators that
/// failed along the way.
#[derive(Debug)]
pub struct PluginOutput {
    pub response: Vec<u8>,
    pub failures: Vec<Failure>,
}

/// The whole plugin: decode the request, configure, translate, generate,
/// encode the response. Only fatal errors are returned as `Err`.
pub fn run_plugin(input: &[u8]) -> Result<PluginOutput, BoilError> {
    let request = CodeGeneratorRequest::decode(input)?;
    let config = configure(request.parameter())?;
    init_logging(&config, LogMode::Truncate)?;
    info!("Request parameters: {:?}", request.parameter());
    info!("Config: {:?}", config);

    let catalog = default_catalog(&config);
    let batch = generate(&request, config, &catalog)?;
    let (response, failures) = response(batch);

    info!("Writing response");
    Ok(PluginOutput {
        response: response.encode_to_vec(),
        failures,
    })
}
