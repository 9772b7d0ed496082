//! Minimal "Go-style" emitter, the second target named in the core's scope.
//! Mirrors `cpp` structurally but renders Go type names and `struct`/`[]T`
//! slice conventions instead.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::emit::{EmitContext, Emitter};
use crate::error::{Location, PacketError};
use crate::model::packet::SizeDetail;
use crate::model::{Packet, TypeRef};
use crate::name_helpers::to_pascal_case;
use crate::types::BuiltinType;

pub struct GoEmitter;

fn go_builtin_name(b: BuiltinType) -> &'static str {
    match b {
        BuiltinType::Char => "byte",
        BuiltinType::Int8 => "int8",
        BuiltinType::Int16 => "int16",
        BuiltinType::Int32 => "int32",
        BuiltinType::Int64 => "int64",
        BuiltinType::Uint8 => "uint8",
        BuiltinType::Uint16 => "uint16",
        BuiltinType::Uint32 => "uint32",
        BuiltinType::Uint64 => "uint64",
    }
}

fn type_name(ctx: &EmitContext, ty: TypeRef) -> String {
    match ty {
        TypeRef::Builtin(b) => go_builtin_name(b).to_string(),
        TypeRef::Packet(pref) => {
            let target_pom = if pref.pom == ctx.pom_id { ctx.pom } else { &ctx.world[pref.pom.0] };
            to_pascal_case(&target_pom.packets[pref.packet.0].name)
        }
    }
}

fn render_packet(ctx: &EmitContext, packet: &Packet, out: &mut String) -> Result<(), PacketError> {
    let struct_name = to_pascal_case(&packet.name);
    if packet.size_info.is_none() {
        return Err(PacketError::LayoutError {
            location: Location::packet(ctx.pom.path.clone(), packet.name.clone()),
            message: format!("{} was emitted before the analysis pipeline ran", packet.name),
        });
    }
    let size_comment = match packet.size_info {
        Some(SizeDetail::Constant(n)) => format!("const-size, {n} bytes"),
        Some(SizeDetail::SizeField(_)) => "dynamic-size, size carried in a field".to_string(),
        Some(SizeDetail::Custom) | None => "dynamic-size, custom".to_string(),
    };

    writeln!(out, "// {struct_name}: {size_comment}").ok();
    writeln!(out, "type {struct_name} struct {{").ok();
    if let Some(parent) = packet.parent {
        writeln!(out, "\t{}", type_name(ctx, TypeRef::Packet(parent))).ok();
    }
    for field in &packet.fields {
        let ty = type_name(ctx, field.field_type);
        let field_name = to_pascal_case(&field.name);
        if let Some(repeated) = &field.repeated_info {
            match repeated.count {
                Some(count) => writeln!(out, "\t{field_name} [{count}]{ty}").ok(),
                None => writeln!(out, "\t{field_name} []{ty}").ok(),
            };
        } else {
            writeln!(out, "\t{field_name} {ty}").ok();
        }
    }
    writeln!(out, "}}").ok();
    writeln!(out).ok();
    Ok(())
}

impl Emitter for GoEmitter {
    fn id(&self) -> &'static str {
        "go"
    }

    fn emit(&self, ctx: &EmitContext, out_dir: &Path) -> Result<(), PacketError> {
        let mut out = String::new();
        writeln!(out, "package {}", ctx.pom.namespace).ok();
        writeln!(out).ok();

        for e in &ctx.pom.enums {
            writeln!(out, "type {} int64", to_pascal_case(&e.name)).ok();
            writeln!(out, "const (").ok();
            for item in &e.items {
                writeln!(out, "\t{}_{} {} = {}", to_pascal_case(&e.name), item.name, to_pascal_case(&e.name), item.value).ok();
            }
            writeln!(out, ")").ok();
            writeln!(out).ok();
        }

        for packet in &ctx.pom.packets {
            render_packet(ctx, packet, &mut out)?;
        }

        let path = out_dir.join(format!("{}.go", ctx.pom.namespace));
        fs::write(&path, out).map_err(|source| PacketError::Io { location: Location::file(path), source })
    }
}
