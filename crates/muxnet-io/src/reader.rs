//! Two-phase reader for the network description format.
//!
//! Phase one registers the schema — `#LAYERS` and the three attribute
//! sections — and phase two validates every `#ACTORS` / `#VERTICES` /
//! `#EDGES` record against it, failing fast with the offending line
//! number. A file with no section headers at all is read as a plain
//! `actor1,actor2,layer` edge list over undirected, auto-created layers.

use std::collections::HashMap;
use std::io::BufRead;

use tracing::debug;

use muxnet_graph::{
    AttrScope, AttrType, AttrValue, EdgeDirectionality, LayerId, MultilayerStore,
};

use crate::error::FormatError;

// ─────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// After loading, insert missing vertices so every actor is present
    /// on every layer.
    pub align: bool,
}

// ─────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Layers,
    ActorAttrs,
    VertexAttrs,
    EdgeAttrs,
    Actors,
    Vertices,
    Edges,
}

fn parse_section(name: &str) -> Option<Section> {
    match name {
        "#LAYERS" => Some(Section::Layers),
        "#ACTOR ATTRIBUTES" => Some(Section::ActorAttrs),
        "#VERTEX ATTRIBUTES" => Some(Section::VertexAttrs),
        "#EDGE ATTRIBUTES" => Some(Section::EdgeAttrs),
        "#ACTORS" => Some(Section::Actors),
        "#VERTICES" => Some(Section::Vertices),
        "#EDGES" => Some(Section::Edges),
        _ => None,
    }
}

struct Record {
    line: usize,
    section: Section,
    fields: Vec<String>,
}

// ─────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────

pub fn read_network_str(
    input: &str,
    options: &LoadOptions,
) -> Result<MultilayerStore, FormatError> {
    read_network(input.as_bytes(), options)
}

pub fn read_network<R: BufRead>(
    reader: R,
    options: &LoadOptions,
) -> Result<MultilayerStore, FormatError> {
    let records = collect_records(reader)?;

    let mut store = MultilayerStore::new();
    let schema = schema_pass(&mut store, &records)?;
    data_pass(&mut store, &records, &schema)?;

    if options.align {
        let actors = store.actor_ids();
        let layers = store.layer_ids();
        store.align(&actors, &layers)?;
    }

    debug!(
        actors = store.actor_count(),
        layers = store.layer_count(),
        "network description loaded"
    );
    Ok(store)
}

// ─────────────────────────────────────────────
// Line collection
// ─────────────────────────────────────────────

fn collect_records<R: BufRead>(reader: R) -> Result<Vec<Record>, FormatError> {
    let mut raw: Vec<(usize, Option<Section>, Vec<String>)> = Vec::new();
    let mut current: Option<Section> = None;
    let mut has_sections = false;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            let name = trimmed.to_ascii_uppercase();
            let section = parse_section(&name).ok_or(FormatError::UnknownSection {
                line: line_no,
                name: trimmed.to_owned(),
            })?;
            current = Some(section);
            has_sections = true;
            continue;
        }
        let fields = trimmed.split(',').map(|f| f.trim().to_owned()).collect();
        raw.push((line_no, current, fields));
    }

    raw.into_iter()
        .map(|(line, section, fields)| {
            let section = match section {
                Some(s) => s,
                // a minimal headerless file is a plain edge list; once
                // any section exists, stray records are errors
                None if !has_sections => Section::Edges,
                None => {
                    return Err(FormatError::BadRecord {
                        line,
                        message: "record before any section header".to_owned(),
                    })
                }
            };
            Ok(Record { line, section, fields })
        })
        .collect()
}

// ─────────────────────────────────────────────
// Schema pass
// ─────────────────────────────────────────────

/// Attribute declarations in file order, per scope — the column order
/// for data records.
struct SchemaIndex {
    /// Layers were explicitly declared; undeclared references are errors
    /// instead of auto-created undirected layers.
    declared_layers: bool,
    actor_attrs: Vec<(String, AttrType)>,
    vertex_attrs: HashMap<LayerId, Vec<(String, AttrType)>>,
    edge_attrs: HashMap<LayerId, Vec<(String, AttrType)>>,
}

fn schema_pass(
    store: &mut MultilayerStore,
    records: &[Record],
) -> Result<SchemaIndex, FormatError> {
    let mut schema = SchemaIndex {
        declared_layers: false,
        actor_attrs: Vec::new(),
        vertex_attrs: HashMap::new(),
        edge_attrs: HashMap::new(),
    };

    // layers first: attribute declarations may reference them
    for r in records.iter().filter(|r| r.section == Section::Layers) {
        expect_fields(r, 2)?;
        let directionality = parse_directionality(&r.fields[1], r.line)?;
        store
            .add_layer(&r.fields[0], directionality)
            .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
        schema.declared_layers = true;
    }

    for r in records {
        match r.section {
            Section::ActorAttrs => {
                expect_fields(r, 2)?;
                let ty = parse_attr_type(&r.fields[1], r.line)?;
                store
                    .declare_attribute(AttrScope::Actor, &r.fields[0], ty)
                    .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
                schema.actor_attrs.push((r.fields[0].clone(), ty));
            }
            Section::VertexAttrs | Section::EdgeAttrs => {
                expect_fields(r, 3)?;
                let ty = parse_attr_type(&r.fields[2], r.line)?;
                let layer = resolve_layer(store, &r.fields[1], schema.declared_layers, r.line)?;
                let (scope, index) = if r.section == Section::VertexAttrs {
                    (AttrScope::Vertex(layer), &mut schema.vertex_attrs)
                } else {
                    (AttrScope::Edge(layer), &mut schema.edge_attrs)
                };
                store
                    .declare_attribute(scope, &r.fields[0], ty)
                    .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
                index.entry(layer).or_default().push((r.fields[0].clone(), ty));
            }
            _ => {}
        }
    }
    Ok(schema)
}

// ─────────────────────────────────────────────
// Data pass
// ─────────────────────────────────────────────

fn data_pass(
    store: &mut MultilayerStore,
    records: &[Record],
    schema: &SchemaIndex,
) -> Result<(), FormatError> {
    for r in records.iter().filter(|r| r.section == Section::Actors) {
        let values = attr_values(r, 1, &schema.actor_attrs)?;
        let actor = store.ensure_actor(&r.fields[0]);
        for (name, value) in values {
            store
                .set_actor_attr(actor, &name, value)
                .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
        }
    }

    for r in records.iter().filter(|r| r.section == Section::Vertices) {
        if r.fields.len() < 2 {
            return Err(FormatError::BadRecord {
                line: r.line,
                message: format!("expected at least 2 fields, got {}", r.fields.len()),
            });
        }
        let layer = resolve_layer(store, &r.fields[1], schema.declared_layers, r.line)?;
        let empty = Vec::new();
        let declared = schema.vertex_attrs.get(&layer).unwrap_or(&empty);
        let values = attr_values(r, 2, declared)?;
        let actor = store.ensure_actor(&r.fields[0]);
        store
            .add_vertex(actor, layer)
            .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
        for (name, value) in values {
            store
                .set_vertex_attr(actor, layer, &name, value)
                .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
        }
    }

    for r in records.iter().filter(|r| r.section == Section::Edges) {
        if r.fields.len() < 3 {
            return Err(FormatError::BadRecord {
                line: r.line,
                message: format!("expected at least 3 fields, got {}", r.fields.len()),
            });
        }
        let layer = resolve_layer(store, &r.fields[2], schema.declared_layers, r.line)?;
        let empty = Vec::new();
        let declared = schema.edge_attrs.get(&layer).unwrap_or(&empty);
        let values = attr_values(r, 3, declared)?;
        let from = store.ensure_actor(&r.fields[0]);
        let to = store.ensure_actor(&r.fields[1]);
        for v in [from, to] {
            if !store.contains_vertex(v, layer) {
                store
                    .add_vertex(v, layer)
                    .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
            }
        }
        store
            .add_edge(from, to, layer)
            .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
        for (name, value) in values {
            store
                .set_edge_attr(from, to, layer, &name, value)
                .map_err(|e| FormatError::Schema { line: r.line, source: e })?;
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Field helpers
// ─────────────────────────────────────────────

fn expect_fields(r: &Record, n: usize) -> Result<(), FormatError> {
    if r.fields.len() != n {
        return Err(FormatError::BadRecord {
            line: r.line,
            message: format!("expected {n} fields, got {}", r.fields.len()),
        });
    }
    Ok(())
}

fn parse_directionality(text: &str, line: usize) -> Result<EdgeDirectionality, FormatError> {
    match text.to_ascii_uppercase().as_str() {
        "DIRECTED" => Ok(EdgeDirectionality::Directed),
        "UNDIRECTED" => Ok(EdgeDirectionality::Undirected),
        other => Err(FormatError::BadRecord {
            line,
            message: format!("expected DIRECTED or UNDIRECTED, got {other}"),
        }),
    }
}

fn parse_attr_type(text: &str, line: usize) -> Result<AttrType, FormatError> {
    match text.to_ascii_uppercase().as_str() {
        "NUMERIC" => Ok(AttrType::Numeric),
        "STRING" | "TEXT" => Ok(AttrType::Text),
        "CATEGORICAL" => Ok(AttrType::Categorical),
        other => Err(FormatError::BadRecord {
            line,
            message: format!("unknown attribute type: {other}"),
        }),
    }
}

fn resolve_layer(
    store: &mut MultilayerStore,
    name: &str,
    declared_layers: bool,
    line: usize,
) -> Result<LayerId, FormatError> {
    if let Some(id) = store.layer_id(name) {
        return Ok(id);
    }
    if declared_layers {
        return Err(FormatError::UnknownLayerRef { line, name: name.to_owned() });
    }
    store
        .add_layer(name, EdgeDirectionality::Undirected)
        .map_err(|e| FormatError::Schema { line, source: e })
}

/// Parse the attribute columns of a data record. A record carries either
/// no values or exactly one per declared attribute, in declaration
/// order.
fn attr_values(
    r: &Record,
    base: usize,
    declared: &[(String, AttrType)],
) -> Result<Vec<(String, AttrValue)>, FormatError> {
    let extra = r.fields.len() - base;
    if extra == 0 {
        return Ok(Vec::new());
    }
    if extra != declared.len() {
        return Err(FormatError::BadRecord {
            line: r.line,
            message: format!(
                "expected {base} or {} fields, got {}",
                base + declared.len(),
                r.fields.len()
            ),
        });
    }
    declared
        .iter()
        .zip(r.fields[base..].iter())
        .map(|((name, ty), text)| {
            let value = match ty {
                AttrType::Numeric => {
                    let x: f64 = text.parse().map_err(|_| FormatError::BadRecord {
                        line: r.line,
                        message: format!("attribute {name}: not a number: {text}"),
                    })?;
                    AttrValue::Numeric(x)
                }
                AttrType::Text => AttrValue::Text(text.clone()),
                AttrType::Categorical => AttrValue::Categorical(text.clone()),
            };
            Ok((name.clone(), value))
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use muxnet_graph::Direction;

    const MINIMAL: &str = "\
Luca,Matteo,research
Davide,Matteo,research
Luca,Matteo,friendship
";

    #[test]
    fn minimal_edge_list_loads_unaligned() {
        let store = read_network_str(MINIMAL, &LoadOptions::default()).unwrap();

        assert_eq!(store.actor_count(), 3);
        assert_eq!(store.layer_count(), 2);
        let research = store.layer_id("research").unwrap();
        let friendship = store.layer_id("friendship").unwrap();
        assert_eq!(store.directionality(research), Some(EdgeDirectionality::Undirected));
        assert_eq!(store.order(research), 3);
        assert_eq!(store.order(friendship), 2);
        assert_eq!(store.size(research), 2);
        assert_eq!(store.size(friendship), 1);
    }

    #[test]
    fn align_option_raises_every_layer_to_all_actors() {
        let store = read_network_str(MINIMAL, &LoadOptions { align: true }).unwrap();
        let friendship = store.layer_id("friendship").unwrap();
        assert_eq!(store.order(friendship), 3);

        // the added Davide vertex is isolated
        let davide = store.actor_id("Davide").unwrap();
        assert_eq!(store.degree_in_layer(davide, friendship, Direction::Both), 0);
    }

    #[test]
    fn full_file_with_sections_and_attributes() {
        let input = "\
#LAYERS
research,UNDIRECTED
friendship,UNDIRECTED

#ACTOR ATTRIBUTES
age,NUMERIC

#VERTEX ATTRIBUTES
office,research,STRING

#EDGE ATTRIBUTES
papers,research,NUMERIC

#ACTORS
Luca,34
Matteo,33

#VERTICES
Luca,research,B042

#EDGES
Luca,Matteo,research,12
Luca,Matteo,friendship
";
        let store = read_network_str(input, &LoadOptions::default()).unwrap();

        let luca = store.actor_id("Luca").unwrap();
        let matteo = store.actor_id("Matteo").unwrap();
        let research = store.layer_id("research").unwrap();

        assert_eq!(store.get_actor_attr(luca, "age"), Some(&AttrValue::Numeric(34.0)));
        assert_eq!(
            store.get_vertex_attr(luca, research, "office"),
            Some(&AttrValue::Text("B042".into()))
        );
        assert_eq!(
            store.get_edge_attr(luca, matteo, research, "papers"),
            Some(&AttrValue::Numeric(12.0))
        );
        assert_eq!(store.size(research), 1);
    }

    #[test]
    fn directed_layers_parse() {
        let input = "\
#LAYERS
cites,DIRECTED

#EDGES
a,b,cites
";
        let store = read_network_str(input, &LoadOptions::default()).unwrap();
        let cites = store.layer_id("cites").unwrap();
        assert_eq!(store.directionality(cites), Some(EdgeDirectionality::Directed));
        let a = store.actor_id("a").unwrap();
        let b = store.actor_id("b").unwrap();
        assert!(store.contains_edge(a, b, cites));
        assert!(!store.contains_edge(b, a, cites));
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = read_network_str("#NODES\na,b,l\n", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::UnknownSection { line: 1, .. }));
    }

    #[test]
    fn undeclared_layer_is_rejected_once_layers_are_declared() {
        let input = "\
#LAYERS
research,UNDIRECTED

#EDGES
a,b,friendship
";
        let err = read_network_str(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::UnknownLayerRef { .. }));
    }

    #[test]
    fn attribute_arity_mismatch_is_rejected() {
        let input = "\
#ACTOR ATTRIBUTES
age,NUMERIC
group,STRING

#ACTORS
Luca,34
";
        let err = read_network_str(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::BadRecord { .. }));
    }

    #[test]
    fn attribute_type_mismatch_is_rejected() {
        let input = "\
#ACTOR ATTRIBUTES
age,NUMERIC

#ACTORS
Luca,unknown
";
        let err = read_network_str(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::BadRecord { line: 5, .. }));
    }

    #[test]
    fn record_before_any_section_is_rejected() {
        let input = "\
a,b,l
#EDGES
c,d,l
";
        let err = read_network_str(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::BadRecord { line: 1, .. }));
    }

    #[test]
    fn duplicate_edge_record_is_rejected() {
        let input = "a,b,l\nb,a,l\n";
        let err = read_network_str(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::Schema { line: 2, .. }));
    }

    #[test]
    fn isolated_vertices_via_vertices_section() {
        let input = "\
#VERTICES
Davide,friendship

#EDGES
Luca,Matteo,friendship
";
        let store = read_network_str(input, &LoadOptions::default()).unwrap();
        let friendship = store.layer_id("friendship").unwrap();
        assert_eq!(store.order(friendship), 3);
        assert_eq!(store.size(friendship), 1);
    }
}
