//! Command implementations for the Vecina CLI.

use serde_json::Value;

use crate::cli::args::*;
use crate::config::EngineConfig;
use crate::engine::http::HttpEngine;
use crate::error::{Result, VecinaError};
use crate::normalize::NormalizeOptions;
use crate::query::{NeighborRequestBuilder, elastic};
use crate::scale::{RangeBound, SourceRange, TargetRange};
use crate::service::{QueryTarget, SearchOptions, SelfMatch, SimilarityService};
use crate::vector::QueryVector;

/// Execute a CLI command.
pub fn execute_command(args: VecinaArgs) -> Result<()> {
    match &args.command {
        Command::Query(query_args) => render_query(query_args.clone(), &args),
        Command::Search(search_args) => run_search(search_args.clone(), &args),
        Command::Random(random_args) => run_random(random_args.clone(), &args),
    }
}

/// Render the search request body without executing it.
fn render_query(args: QueryArgs, cli_args: &VecinaArgs) -> Result<()> {
    let vector = parse_vector(&args.vector)?;
    let mut builder = NeighborRequestBuilder::new(vector)
        .k(args.k)
        .size(args.size)
        .fields(split_fields(args.fields.as_deref()))
        .vector_field(args.vector_field.as_str());
    for filter in &args.filters {
        let (field, value) = parse_filter(filter)?;
        builder = builder.filter(field, value);
    }
    if let Some(offset) = args.offset {
        builder = builder.offset(offset);
    }
    let body = elastic::neighbor_body(&builder.build()?);
    print_json(&body, cli_args)
}

/// Run a similarity search against the configured engine.
fn run_search(args: SearchArgs, cli_args: &VecinaArgs) -> Result<()> {
    let target = match (&args.vector, &args.field, &args.value) {
        (Some(vector), _, _) => QueryTarget::Vector {
            vector: parse_vector(vector)?,
        },
        (None, Some(field), Some(value)) => QueryTarget::Lookup {
            field: field.clone(),
            value: value.clone(),
        },
        _ => {
            return Err(VecinaError::malformed_input(
                "provide either --vector or --field with --value",
            ));
        }
    };

    let mut filters = std::collections::BTreeMap::new();
    for filter in &args.filters {
        let (field, value) = parse_filter(filter)?;
        filters.insert(field, value);
    }

    let options = SearchOptions {
        k: args.k,
        size: args.size,
        offset: args.offset,
        fields: split_fields(args.fields.as_deref()),
        filters,
        vector_field: args.vector_field.clone(),
        self_match: match args.self_match {
            SelfMatchArg::Auto => SelfMatch::Auto,
            SelfMatchArg::Exclude => SelfMatch::Exclude,
            SelfMatchArg::Keep => SelfMatch::Keep,
        },
        normalize: NormalizeOptions {
            scale_to: args.scale.as_deref().map(parse_target_range).transpose()?,
            scale_from: args
                .scale_from
                .as_deref()
                .map(parse_source_range)
                .transpose()?,
        },
    };

    let service = SimilarityService::new(HttpEngine::new(&EngineConfig::from_env())?);
    let hits = tokio::runtime::Runtime::new()?
        .block_on(service.search(&args.index, target, &options))?;

    if cli_args.verbosity() > 1 {
        eprintln!("{} hits", hits.len());
    }
    print_json(&serde_json::to_value(&hits)?, cli_args)
}

/// Fetch a random sample of documents.
fn run_random(args: RandomArgs, cli_args: &VecinaArgs) -> Result<()> {
    let service = SimilarityService::new(HttpEngine::new(&EngineConfig::from_env())?);
    let hits = tokio::runtime::Runtime::new()?.block_on(service.random(
        &args.index,
        args.size,
        &split_fields(args.fields.as_deref()),
    ))?;
    print_json(&serde_json::to_value(&hits)?, cli_args)
}

/// Parse "0.1,0.2,0.3" into a validated query vector.
fn parse_vector(input: &str) -> Result<QueryVector> {
    let components = input
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| VecinaError::malformed_input(format!("bad vector component: {part}")))
        })
        .collect::<Result<Vec<f64>>>()?;
    QueryVector::new(components)
}

/// Split a comma-separated projection list, trimming each entry.
fn split_fields(input: Option<&str>) -> Vec<String> {
    input
        .map(|fields| {
            fields
                .split(',')
                .map(|field| field.trim().to_string())
                .filter(|field| !field.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse "field=value".
fn parse_filter(input: &str) -> Result<(String, String)> {
    input
        .split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| {
            VecinaError::malformed_input(format!("filter must be FIELD=VALUE, got: {input}"))
        })
}

/// Parse "low,high" into a target range; two integer endpoints select
/// integer output.
fn parse_target_range(input: &str) -> Result<TargetRange> {
    let (low, high) = split_pair(input)?;
    if let (Ok(low), Ok(high)) = (low.parse::<i64>(), high.parse::<i64>()) {
        return Ok(TargetRange::Int { low, high });
    }
    match (low.parse::<f64>(), high.parse::<f64>()) {
        (Ok(low), Ok(high)) => Ok(TargetRange::Float { low, high }),
        _ => Err(VecinaError::malformed_input(format!(
            "scale must be LOW,HIGH numbers, got: {input}"
        ))),
    }
}

/// Parse "low,high" into a source range; "min"/"max" select the observed
/// endpoints.
fn parse_source_range(input: &str) -> Result<SourceRange> {
    let (low, high) = split_pair(input)?;
    Ok(SourceRange {
        low: parse_bound(low)?,
        high: parse_bound(high)?,
    })
}

fn parse_bound(input: &str) -> Result<RangeBound> {
    match input {
        "min" => Ok(RangeBound::ObservedMin),
        "max" => Ok(RangeBound::ObservedMax),
        other => other
            .parse::<f64>()
            .map(RangeBound::Literal)
            .map_err(|_| {
                VecinaError::malformed_input(format!(
                    "range endpoint must be a number, \"min\" or \"max\", got: {other}"
                ))
            }),
    }
}

fn split_pair(input: &str) -> Result<(&str, &str)> {
    input
        .split_once(',')
        .map(|(low, high)| (low.trim(), high.trim()))
        .ok_or_else(|| VecinaError::malformed_input(format!("expected LOW,HIGH, got: {input}")))
}

fn print_json(value: &Value, cli_args: &VecinaArgs) -> Result<()> {
    if cli_args.pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
