//! Turns a parsed [`crate::parser::ast::FileAst`] plus its already-loaded
//! imports into a [`crate::model::Pom`] (spec §4.2): fields are constructed
//! first, without annotations, so field names are resolvable; annotations
//! are then applied in a second pass per packet.

use std::path::PathBuf;

use crate::annotations::{self, Annotation, AnnotationParam, AnnotationTarget, ParamValue, RawParamValue};
use crate::error::{Location, PacketError};
use crate::model::expr::RefPath;
use crate::model::packet::{Padding, SelectorCondition, SizeDetail};
use crate::model::{Enum, EnumItem, Field, FieldId, FieldRef, Packet, PacketId, PacketRef, Pom, PomId, RepeatedInfo, TypeRef};
use crate::parser::ast::{AnnotationAst, DottedName, FieldAst, FileAst, PacketAst};
use crate::types::BuiltinType;

/// Builds a [`Pom`] for `path`/`namespace` out of `ast`.
///
/// `world` holds every POM already loaded (by earlier, unrelated `load`
/// calls as well as this file's own imports); `imports` names which of
/// those correspond to this file's `include` directives. Back-edges
/// (`Packet::children`) are populated by the loader once this POM has
/// itself been inserted into `world`.
pub fn build_pom(
    world: &[Pom],
    pom_id: PomId,
    path: PathBuf,
    namespace: String,
    ast: FileAst,
    imports: Vec<(String, PomId)>,
) -> Result<Pom, PacketError> {
    let mut pom = Pom::new(path, namespace);
    pom.imports = imports;
    for pkg in ast.packages {
        pom.package_bindings.push((pkg.lang, pkg.value));
    }

    for enum_ast in ast.enums {
        let mut e = Enum::new(enum_ast.name, pom_id);
        for item in enum_ast.items {
            e.items.push(EnumItem { name: item.name, expr: item.expr, value: 0 });
        }
        pom.push_enum(e);
    }
    crate::analysis::constants::evaluate_all(world, &mut pom)?;

    for packet_ast in ast.packets {
        build_packet(world, pom_id, &mut pom, packet_ast)?;
    }

    Ok(pom)
}

fn build_packet(
    world: &[Pom],
    pom_id: PomId,
    pom: &mut Pom,
    ast: PacketAst,
) -> Result<(), PacketError> {
    let packet_id = pom.next_packet_id();
    let loc = Location::packet(pom.path.clone(), ast.name.clone());

    let parent = match &ast.parent {
        Some(dotted) => Some(resolve_packet(world, pom, pom_id, dotted, &loc)?),
        None => None,
    };

    let mut fields = Vec::with_capacity(ast.fields.len());
    let mut field_asts: Vec<FieldAst> = Vec::with_capacity(ast.fields.len());
    for field_ast in ast.fields {
        let field_loc = Location::field(pom.path.clone(), ast.name.clone(), field_ast.name.clone());
        let field_type = resolve_type(world, pom, pom_id, &field_ast.field_type, &field_loc)?;
        fields.push(Field::new(field_ast.name.clone(), field_type));
        field_asts.push(field_ast);
    }

    let mut packet = Packet::new(ast.name, pom_id, packet_id);
    packet.parent = parent;
    packet.fields = fields;

    for ann_ast in &ast.annotations {
        let ann_loc = Location {
            packet: Some(packet.name.clone()),
            ..loc.clone()
        };
        let annotation = resolve_annotation(world, pom, ann_ast)?;
        annotations::validate_shape(&annotation, AnnotationTarget::Packet, &ann_loc)?;
        apply_packet_annotation(world, pom, pom_id, &mut packet, &annotation, &ann_loc)?;
        packet.annotations.push(annotation);
    }

    for (i, field_ast) in field_asts.iter().enumerate() {
        for ann_ast in &field_ast.annotations {
            let field_loc = Location::field(pom.path.clone(), packet.name.clone(), field_ast.name.clone());
            let annotation = resolve_annotation(world, pom, ann_ast)?;
            annotations::validate_shape(&annotation, AnnotationTarget::Field, &field_loc)?;
            apply_field_annotation(pom_id, packet_id, &mut packet, i, &annotation, &field_loc)?;
            packet.fields[i].annotations.push(annotation);
        }
    }

    pom.push_packet(packet);
    Ok(())
}

fn apply_packet_annotation(
    world: &[Pom],
    pom: &Pom,
    pom_id: PomId,
    packet: &mut Packet,
    annotation: &Annotation,
    loc: &Location,
) -> Result<(), PacketError> {
    match annotation.name.as_str() {
        "bigendian" => packet.big_endian = true,
        "padded" => {
            let multiple = annotation.int_param("multiple").ok_or_else(|| PacketError::AnnotationShapeError {
                location: loc.clone(),
                message: "@padded requires multiple=N".to_string(),
            })?;
            let multiple: u32 = multiple.try_into().map_err(|_| PacketError::AnnotationShapeError {
                location: loc.clone(),
                message: "@padded multiple must be a non-negative integer".to_string(),
            })?;
            packet.padding = Some(Padding { multiple, excluded: annotation.has_flag("excluded") });
        }
        "custom_size" => {}
        "type_selector" => {
            let mut conditions = Vec::with_capacity(annotation.params.len());
            for param in &annotation.params {
                let field_ref = find_field_in_ancestors(world, pom, pom_id, packet, &param.name).ok_or_else(|| {
                    PacketError::ReferenceError {
                        location: loc.clone(),
                        message: format!(
                            "type_selector field not found in ancestors: {}.{}",
                            packet.name, param.name
                        ),
                    }
                })?;
                let value = param.value.clone().ok_or_else(|| PacketError::AnnotationShapeError {
                    location: loc.clone(),
                    message: format!("type_selector parameter {} has no value", param.name),
                })?;
                conditions.push(SelectorCondition { field: field_ref, value });
            }
            packet.type_selector = Some(conditions);
        }
        other => {
            return Err(PacketError::ReferenceError {
                location: loc.clone(),
                message: format!("unhandled packet annotation @{other}"),
            })
        }
    }
    Ok(())
}

fn apply_field_annotation(
    pom_id: PomId,
    packet_id: PacketId,
    packet: &mut Packet,
    field_index: usize,
    annotation: &Annotation,
    loc: &Location,
) -> Result<(), PacketError> {
    let self_ref = FieldRef { pom: pom_id, packet: packet_id, field: FieldId(field_index) };
    match annotation.name.as_str() {
        "size" => {
            if let Some(param) = annotation.params.first() {
                let target_idx = find_field_index(packet, &param.name).ok_or_else(|| PacketError::ReferenceError {
                    location: loc.clone(),
                    message: format!("@size references unknown field: {}", param.name),
                })?;
                ensure_repeated_info(&mut packet.fields[target_idx]).size_field = Some(self_ref);
            } else {
                packet.size_info = Some(SizeDetail::SizeField(self_ref));
            }
        }
        "count" => {
            let param = annotation.params.first().ok_or_else(|| PacketError::AnnotationShapeError {
                location: loc.clone(),
                message: "@count requires a field name parameter".to_string(),
            })?;
            let target_idx = find_field_index(packet, &param.name).ok_or_else(|| PacketError::ReferenceError {
                location: loc.clone(),
                message: format!("@count references unknown field: {}", param.name),
            })?;
            ensure_repeated_info(&mut packet.fields[target_idx]).count_field = Some(self_ref);
        }
        "repeated" => {
            let field = &mut packet.fields[field_index];
            if let Some(count_param) = annotation.params.first() {
                if field.repeated_info.is_some() {
                    return Err(PacketError::AnnotationShapeError {
                        location: loc.clone(),
                        message: format!("{} already has a size or count field", field.name),
                    });
                }
                let count = annotation.int_param(&count_param.name).ok_or_else(|| PacketError::AnnotationShapeError {
                    location: loc.clone(),
                    message: format!("@repeated(count=...) on {} is not an integer", field.name),
                })?;
                let count: u32 = count.try_into().map_err(|_| PacketError::AnnotationShapeError {
                    location: loc.clone(),
                    message: format!("@repeated count on {} must be non-negative", field.name),
                })?;
                field.repeated_info = Some(RepeatedInfo { count: Some(count), ..Default::default() });
            } else {
                ensure_repeated_info(field);
            }
        }
        other => {
            return Err(PacketError::ReferenceError {
                location: loc.clone(),
                message: format!("unhandled field annotation @{other}"),
            })
        }
    }
    Ok(())
}

fn ensure_repeated_info(field: &mut Field) -> &mut RepeatedInfo {
    if field.repeated_info.is_none() {
        field.repeated_info = Some(RepeatedInfo::default());
    }
    field.repeated_info.as_mut().unwrap()
}

fn find_field_index(packet: &Packet, name: &str) -> Option<usize> {
    packet.fields.iter().position(|f| f.name == name)
}

fn find_field_in_ancestors(
    world: &[Pom],
    pom: &Pom,
    pom_id: PomId,
    packet: &Packet,
    name: &str,
) -> Option<FieldRef> {
    let mut current = packet.parent;
    while let Some(PacketRef { pom: ppom, packet: ppacket }) = current {
        let parent_pom = if ppom == pom_id { pom } else { &world[ppom.0] };
        let parent_packet = &parent_pom.packets[ppacket.0];
        if let Some((field_ref, _)) = parent_packet.find_field(name) {
            return Some(field_ref);
        }
        current = parent_packet.parent;
    }
    None
}

fn resolve_type(
    world: &[Pom],
    pom: &Pom,
    pom_id: PomId,
    dotted: &DottedName,
    loc: &Location,
) -> Result<TypeRef, PacketError> {
    if dotted.0.len() == 1 {
        let name = &dotted.0[0];
        if let Some(builtin) = BuiltinType::lookup(name) {
            return Ok(TypeRef::Builtin(builtin));
        }
    }
    Ok(TypeRef::Packet(resolve_packet(world, pom, pom_id, dotted, loc)?))
}

fn resolve_packet(
    world: &[Pom],
    pom: &Pom,
    pom_id: PomId,
    dotted: &DottedName,
    loc: &Location,
) -> Result<PacketRef, PacketError> {
    match dotted.0.as_slice() {
        [name] => pom
            .find_packet(name)
            .map(|id| PacketRef { pom: pom_id, packet: id })
            .ok_or_else(|| PacketError::ReferenceError {
                location: loc.clone(),
                message: format!("unknown packet: {name}"),
            }),
        [namespace, name] if namespace == &pom.namespace => pom
            .find_packet(name)
            .map(|id| PacketRef { pom: pom_id, packet: id })
            .ok_or_else(|| PacketError::ReferenceError {
                location: loc.clone(),
                message: format!("unknown packet: {namespace}.{name}"),
            }),
        [namespace, name] => {
            let import_id = pom.import(namespace).ok_or_else(|| PacketError::ReferenceError {
                location: loc.clone(),
                message: format!("unknown namespace: {namespace}"),
            })?;
            let imported = &world[import_id.0];
            imported
                .find_packet(name)
                .map(|id| PacketRef { pom: import_id, packet: id })
                .ok_or_else(|| PacketError::ReferenceError {
                    location: loc.clone(),
                    message: format!("unknown packet: {namespace}.{name}"),
                })
        }
        _ => Err(PacketError::ReferenceError {
            location: loc.clone(),
            message: format!("unsupported qualified name: {}", dotted.as_dotted()),
        }),
    }
}

fn resolve_annotation(world: &[Pom], pom: &Pom, ast: &AnnotationAst) -> Result<Annotation, PacketError> {
    let loc = Location::file(pom.path.clone());
    let mut params = Vec::with_capacity(ast.params.len());
    for p in &ast.params {
        let value = match &p.value {
            Some(raw) => Some(resolve_param_value(world, pom, raw, &loc)?),
            None => None,
        };
        params.push(AnnotationParam { name: p.name.clone(), value });
    }
    Ok(Annotation { name: ast.name.clone(), params })
}

fn resolve_param_value(world: &[Pom], pom: &Pom, raw: &RawParamValue, loc: &Location) -> Result<ParamValue, PacketError> {
    Ok(match raw {
        RawParamValue::Str(s) => ParamValue::Str(s.clone()),
        RawParamValue::Hex(v) | RawParamValue::Dec(v) => ParamValue::Int(*v),
        RawParamValue::Float(s) => ParamValue::Float(s.parse().map_err(|_| PacketError::AnnotationShapeError {
            location: loc.clone(),
            message: format!("invalid float literal: {s}"),
        })?),
        RawParamValue::Ref(path) => ParamValue::Int(resolve_enum_value(world, pom, path, loc)?),
    })
}

fn resolve_enum_value(world: &[Pom], pom: &Pom, path: &RefPath, loc: &Location) -> Result<i64, PacketError> {
    let not_found = || PacketError::ReferenceError {
        location: loc.clone(),
        message: format!("unknown enum item reference: {}", path.0.join(".")),
    };
    match path.0.as_slice() {
        [enum_name, item_name] => {
            let e = pom.enums.iter().find(|e| &e.name == enum_name).ok_or_else(not_found)?;
            e.items.iter().find(|i| &i.name == item_name).map(|i| i.value).ok_or_else(not_found)
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

#[cfg(test)]
mod tests {
    use crate::model::packet::SizeDetail;
    use crate::test_support::{build, try_build};

    #[test]
    fn unknown_annotation_is_rejected() {
        let err = try_build("@nope packet P { uint8 a; }").unwrap_err();
        assert!(matches!(err, crate::error::PacketError::ReferenceError { .. }));
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let err = try_build("packet P { Nonexistent a; }").unwrap_err();
        assert!(matches!(err, crate::error::PacketError::ReferenceError { .. }));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = try_build("packet P : Nonexistent { uint8 a; }").unwrap_err();
        assert!(matches!(err, crate::error::PacketError::ReferenceError { .. }));
    }

    #[test]
    fn padded_with_excluded_flag() {
        let pom = build("@padded(multiple=4, excluded) packet P { uint8 a; }");
        let p = &pom.packets[0];
        let padding = p.padding.expect("padding applied");
        assert_eq!(padding.multiple, 4);
        assert!(padding.excluded);
    }

    #[test]
    fn padded_without_multiple_is_rejected() {
        let err = try_build("@padded packet P { uint8 a; }").unwrap_err();
        assert!(matches!(err, crate::error::PacketError::AnnotationShapeError { .. }));
    }

    /// `type_selector` resolves its field parameters by walking the parent
    /// chain, and rejects a parameter that has no value.
    #[test]
    fn type_selector_resolves_against_ancestor_fields() {
        let pom = build(
            r#"
            packet Header {
              uint8 kind;
            }
            @type_selector(kind=1)
            packet Variant : Header {
              uint8 payload;
            }
            "#,
        );
        let variant = &pom.packets[pom.find_packet("Variant").unwrap().0];
        let conditions = variant.type_selector.as_ref().expect("type_selector applied");
        assert_eq!(conditions.len(), 1);
        let header = &pom.packets[pom.find_packet("Header").unwrap().0];
        let (kind_ref, _) = header.find_field("kind").unwrap();
        assert_eq!(conditions[0].field, kind_ref);
    }

    #[test]
    fn type_selector_field_missing_from_ancestors_is_rejected() {
        let err = try_build(
            r#"
            packet Header {
              uint8 kind;
            }
            @type_selector(missing=1)
            packet Variant : Header {
              uint8 payload;
            }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::PacketError::ReferenceError { .. }));
    }

    /// Explicit `@repeated(count=N)` combined with a pre-set size/count
    /// descriptor on the same field is an error.
    #[test]
    fn repeated_count_conflicting_with_count_field_is_rejected() {
        let err = try_build(
            r#"
            packet M {
              @count(data) uint16 cnt;
              @repeated(count=4) uint8 data;
            }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::PacketError::AnnotationShapeError { .. }));
    }

    /// `@size` with no parameter marks the field itself as the packet's
    /// size field at construction time, ahead of the size pass.
    #[test]
    fn bare_size_annotation_sets_packet_size_field() {
        let pom = build("packet P { @size uint16 len; @repeated uint8 payload; }");
        let p = &pom.packets[0];
        assert!(matches!(p.size_info, Some(SizeDetail::SizeField(_))));
    }
}
