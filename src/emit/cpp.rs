//! Minimal C++ emitter: one header per POM, one `struct` per packet
//! annotated with the layout metadata the analysis pipeline computed.
//! Rendering style is intentionally plain; byte-accurate (de)serialization
//! code is outside the core's scope.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::emit::{EmitContext, Emitter};
use crate::error::{Location, PacketError};
use crate::model::packet::SizeDetail;
use crate::model::{Packet, TypeRef};
use crate::name_helpers::to_pascal_case;
use crate::types::BuiltinType;

pub struct CppEmitter;

fn cpp_builtin_name(b: BuiltinType) -> &'static str {
    match b {
        BuiltinType::Char => "char",
        BuiltinType::Int8 => "int8_t",
        BuiltinType::Int16 => "int16_t",
        BuiltinType::Int32 => "int32_t",
        BuiltinType::Int64 => "int64_t",
        BuiltinType::Uint8 => "uint8_t",
        BuiltinType::Uint16 => "uint16_t",
        BuiltinType::Uint32 => "uint32_t",
        BuiltinType::Uint64 => "uint64_t",
    }
}

fn type_name(ctx: &EmitContext, ty: TypeRef) -> String {
    match ty {
        TypeRef::Builtin(b) => cpp_builtin_name(b).to_string(),
        TypeRef::Packet(pref) => {
            let target_pom = if pref.pom == ctx.pom_id { ctx.pom } else { &ctx.world[pref.pom.0] };
            to_pascal_case(&target_pom.packets[pref.packet.0].name)
        }
    }
}

fn render_packet(ctx: &EmitContext, packet: &Packet, out: &mut String) -> Result<(), PacketError> {
    let struct_name = to_pascal_case(&packet.name);
    let size_comment = match packet.size_info {
        Some(SizeDetail::Constant(n)) => format!("const-size, {n} bytes"),
        Some(SizeDetail::SizeField(_)) => "dynamic-size, size carried in a field".to_string(),
        Some(SizeDetail::Custom) => "dynamic-size, custom".to_string(),
        None => {
            return Err(PacketError::LayoutError {
                location: Location::packet(ctx.pom.path.clone(), packet.name.clone()),
                message: format!("{} was emitted before the analysis pipeline ran", packet.name),
            })
        }
    };

    writeln!(out, "// {struct_name}: {size_comment}").ok();
    if packet.big_endian {
        writeln!(out, "// big-endian").ok();
    }
    let parent_name = packet.parent.map(|pref| type_name(ctx, TypeRef::Packet(pref)));
    match &parent_name {
        Some(parent) => writeln!(out, "struct {struct_name} : public {parent} {{").ok(),
        None => writeln!(out, "struct {struct_name} {{").ok(),
    };

    for field in &packet.fields {
        let ty = type_name(ctx, field.field_type);
        let field_name = crate::name_helpers::to_snake_case(&field.name);
        if let Some(repeated) = &field.repeated_info {
            match repeated.count {
                Some(count) => writeln!(out, "  {ty} {field_name}[{count}];").ok(),
                None => writeln!(out, "  std::vector<{ty}> {field_name};").ok(),
            };
        } else {
            writeln!(out, "  {ty} {field_name};").ok();
        }
    }
    writeln!(out, "}};").ok();
    writeln!(out).ok();
    Ok(())
}

impl Emitter for CppEmitter {
    fn id(&self) -> &'static str {
        "cpp"
    }

    fn emit(&self, ctx: &EmitContext, out_dir: &Path) -> Result<(), PacketError> {
        let mut out = String::new();
        writeln!(out, "#pragma once").ok();
        writeln!(out, "#include <cstdint>").ok();
        writeln!(out, "#include <vector>").ok();
        writeln!(out).ok();

        for e in &ctx.pom.enums {
            writeln!(out, "enum class {} : int64_t {{", to_pascal_case(&e.name)).ok();
            for item in &e.items {
                writeln!(out, "  {} = {},", item.name, item.value).ok();
            }
            writeln!(out, "}};").ok();
            writeln!(out).ok();
        }

        for packet in &ctx.pom.packets {
            render_packet(ctx, packet, &mut out)?;
        }

        let namespace = &ctx.pom.namespace;
        let file_name = format!("{namespace}.h");
        let path = out_dir.join(file_name);
        fs::write(&path, out).map_err(|source| PacketError::Io { location: Location::file(path), source })
    }
}
