//! Enum constant-expression evaluation (spec §9): a small evaluator over
//! `+ - * / << >>` with leaf nodes that are integer literals or references
//! to enum items, possibly not yet evaluated (self-referential enums are
//! tolerated by deferring evaluation, with cycle detection) or imported
//! from another POM (already fully evaluated, by load order).

use std::collections::{HashMap, HashSet};

use crate::error::{Location, PacketError};
use crate::model::expr::{Expr, RefPath};
use crate::model::Pom;

type Key = (usize, usize);

pub fn evaluate_all(world: &[Pom], pom: &mut Pom) -> Result<(), PacketError> {
    let mut cache: HashMap<Key, i64> = HashMap::new();
    let mut visiting: HashSet<Key> = HashSet::new();

    for enum_idx in 0..pom.enums.len() {
        for item_idx in 0..pom.enums[enum_idx].items.len() {
            eval_item(world, pom, enum_idx, item_idx, &mut cache, &mut visiting)?;
        }
    }

    for enum_idx in 0..pom.enums.len() {
        for item_idx in 0..pom.enums[enum_idx].items.len() {
            pom.enums[enum_idx].items[item_idx].value = cache[&(enum_idx, item_idx)];
        }
    }
    Ok(())
}

fn loc(pom: &Pom, enum_idx: usize, item_idx: usize) -> Location {
    let e = &pom.enums[enum_idx];
    Location::field(pom.path.clone(), format!("enum {}", e.name), e.items[item_idx].name.clone())
}

fn eval_item(
    world: &[Pom],
    pom: &Pom,
    enum_idx: usize,
    item_idx: usize,
    cache: &mut HashMap<Key, i64>,
    visiting: &mut HashSet<Key>,
) -> Result<i64, PacketError> {
    let key = (enum_idx, item_idx);
    if let Some(v) = cache.get(&key) {
        return Ok(*v);
    }
    if !visiting.insert(key) {
        return Err(PacketError::ReferenceError {
            location: loc(pom, enum_idx, item_idx),
            message: format!(
                "cyclic enum constant expression involving {}.{}",
                pom.enums[enum_idx].name, pom.enums[enum_idx].items[item_idx].name
            ),
        });
    }
    let expr = pom.enums[enum_idx].items[item_idx].expr.clone();
    let value = eval_expr(world, pom, enum_idx, &expr, cache, visiting)?;
    visiting.remove(&key);
    cache.insert(key, value);
    Ok(value)
}

fn eval_expr(
    world: &[Pom],
    pom: &Pom,
    current_enum: usize,
    expr: &Expr,
    cache: &mut HashMap<Key, i64>,
    visiting: &mut HashSet<Key>,
) -> Result<i64, PacketError> {
    match expr {
        Expr::IntLiteral(v) => Ok(*v),
        Expr::ItemRef(path) => resolve_ref(world, pom, current_enum, path, cache, visiting),
        Expr::BinOp(lhs, op, rhs) => {
            let l = eval_expr(world, pom, current_enum, lhs, cache, visiting)?;
            let r = eval_expr(world, pom, current_enum, rhs, cache, visiting)?;
            op.apply(l, r).ok_or_else(|| PacketError::ReferenceError {
                location: Location::file(pom.path.clone()),
                message: "enum constant expression overflowed or shifted by a negative amount".to_string(),
            })
        }
    }
}

fn resolve_ref(
    world: &[Pom],
    pom: &Pom,
    current_enum: usize,
    path: &RefPath,
    cache: &mut HashMap<Key, i64>,
    visiting: &mut HashSet<Key>,
) -> Result<i64, PacketError> {
    let not_found = || PacketError::ReferenceError {
        location: Location::file(pom.path.clone()),
        message: format!("unknown enum item reference: {}", path.0.join(".")),
    };
    match path.0.as_slice() {
        [item_name] => {
            let item_idx = pom.enums[current_enum].find_item(item_name).ok_or_else(not_found)?;
            eval_item(world, pom, current_enum, item_idx, cache, visiting)
        }
        [enum_name, item_name] => {
            let enum_idx = pom.enums.iter().position(|e| &e.name == enum_name).ok_or_else(not_found)?;
            let item_idx = pom.enums[enum_idx].find_item(item_name).ok_or_else(not_found)?;
            eval_item(world, pom, enum_idx, item_idx, cache, visiting)
        }
        [namespace, enum_name, item_name] => {
            let import_id = pom.import(namespace).ok_or_else(not_found)?;
            let imported = &world[import_id.0];
            let e = imported.enums.iter().find(|e| &e.name == enum_name).ok_or_else(not_found)?;
            e.items.iter().find(|i| &i.name == item_name).map(|i| i.value).ok_or_else(not_found)
        }
        _ => Err(not_found()),
    }
}
