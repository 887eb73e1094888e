//! Writer for the network description format. Emits a file the reader
//! round-trips: layers, attribute declarations, actors, isolated or
//! attributed vertices, and edges.

use std::collections::HashSet;
use std::io::Write;

use muxnet_graph::{
    ActorId, AttrScope, AttrType, AttrValue, Direction, LayerId, MultilayerStore,
};

use crate::error::FormatError;

fn type_keyword(ty: AttrType) -> &'static str {
    match ty {
        AttrType::Numeric => "NUMERIC",
        AttrType::Text => "STRING",
        AttrType::Categorical => "CATEGORICAL",
    }
}

/// Attribute values of one record, in the declared (sorted) order.
/// `None` unless every declared attribute is set — records are written
/// all-or-nothing, matching the reader's arity rule.
fn full_values<'a>(
    declared: &[(String, AttrType)],
    get: impl Fn(&str) -> Option<&'a AttrValue>,
) -> Option<Vec<String>> {
    if declared.is_empty() {
        return None;
    }
    declared
        .iter()
        .map(|(name, _)| get(name).map(ToString::to_string))
        .collect()
}

pub fn write_network<W: Write>(
    store: &MultilayerStore,
    writer: &mut W,
) -> Result<(), FormatError> {
    let layers = store.layer_ids();

    if !layers.is_empty() {
        writeln!(writer, "#LAYERS")?;
        for &l in &layers {
            let name = store.layer_name(l).unwrap_or_default();
            let directionality = store
                .directionality(l)
                .ok_or_else(|| FormatError::BadRecord {
                    line: 0,
                    message: format!("layer {l} has no directionality"),
                })?;
            writeln!(writer, "{name},{directionality}")?;
        }
        writeln!(writer)?;
    }

    let actor_attrs = store.declared_attributes(AttrScope::Actor);
    if !actor_attrs.is_empty() {
        writeln!(writer, "#ACTOR ATTRIBUTES")?;
        for (name, ty) in &actor_attrs {
            writeln!(writer, "{name},{}", type_keyword(*ty))?;
        }
        writeln!(writer)?;
    }

    write_scoped_attrs(store, writer, &layers, "#VERTEX ATTRIBUTES", AttrScope::Vertex)?;
    write_scoped_attrs(store, writer, &layers, "#EDGE ATTRIBUTES", AttrScope::Edge)?;

    // actors: all of them when attributes are declared, otherwise only
    // those no edge or vertex record would recreate
    let with_vertices: HashSet<ActorId> = store.actors_in(&layers).into_iter().collect();
    let actor_rows: Vec<ActorId> = if actor_attrs.is_empty() {
        store.actor_ids().into_iter().filter(|a| !with_vertices.contains(a)).collect()
    } else {
        store.actor_ids()
    };
    if !actor_rows.is_empty() {
        writeln!(writer, "#ACTORS")?;
        for a in actor_rows {
            let name = store.actor_name(a).unwrap_or_default();
            match full_values(&actor_attrs, |attr| store.get_actor_attr(a, attr)) {
                Some(values) => writeln!(writer, "{name},{}", values.join(","))?,
                None => writeln!(writer, "{name}")?,
            }
        }
        writeln!(writer)?;
    }

    // vertices: isolated ones, plus any carrying a full attribute record
    let mut vertex_rows: Vec<(ActorId, LayerId, Option<Vec<String>>)> = Vec::new();
    for (a, l) in store.vertices(None, None) {
        let declared = store.declared_attributes(AttrScope::Vertex(l));
        let values = full_values(&declared, |attr| store.get_vertex_attr(a, l, attr));
        let isolated = store.degree_in_layer(a, l, Direction::Both) == 0;
        if isolated || values.is_some() {
            vertex_rows.push((a, l, values));
        }
    }
    if !vertex_rows.is_empty() {
        writeln!(writer, "#VERTICES")?;
        for (a, l, values) in vertex_rows {
            let actor = store.actor_name(a).unwrap_or_default();
            let layer = store.layer_name(l).unwrap_or_default();
            match values {
                Some(v) => writeln!(writer, "{actor},{layer},{}", v.join(","))?,
                None => writeln!(writer, "{actor},{layer}")?,
            }
        }
        writeln!(writer)?;
    }

    let edges = store.edges(None);
    if !edges.is_empty() {
        writeln!(writer, "#EDGES")?;
        for e in edges {
            let from = store.actor_name(e.from).unwrap_or_default();
            let to = store.actor_name(e.to).unwrap_or_default();
            let layer = store.layer_name(e.layer).unwrap_or_default();
            let declared = store.declared_attributes(AttrScope::Edge(e.layer));
            match full_values(&declared, |attr| store.get_edge_attr(e.from, e.to, e.layer, attr))
            {
                Some(v) => writeln!(writer, "{from},{to},{layer},{}", v.join(","))?,
                None => writeln!(writer, "{from},{to},{layer}")?,
            }
        }
    }
    Ok(())
}

fn write_scoped_attrs<W: Write>(
    store: &MultilayerStore,
    writer: &mut W,
    layers: &[LayerId],
    header: &str,
    scope: impl Fn(LayerId) -> AttrScope,
) -> Result<(), FormatError> {
    let mut rows = Vec::new();
    for &l in layers {
        let layer = store.layer_name(l).unwrap_or_default().to_owned();
        for (name, ty) in store.declared_attributes(scope(l)) {
            rows.push(format!("{name},{layer},{}", type_keyword(ty)));
        }
    }
    if !rows.is_empty() {
        writeln!(writer, "{header}")?;
        for row in rows {
            writeln!(writer, "{row}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
