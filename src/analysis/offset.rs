//! Offset pass (spec §4.4.2): assigns every field a `(constant_bytes,
//! intermediate_fields[])` offset pair, continuing accumulation from the
//! parent packet's last field.

use crate::error::PacketError;
use crate::model::{Field, FieldRef, Offset, Packet, PacketRef, Pom, PomId, TypeRef};

fn get_packet<'a>(world_before: &'a [Pom], pom: &'a Pom, my_id: PomId, pref: PacketRef) -> &'a Packet {
    if pref.pom == my_id {
        &pom.packets[pref.packet.0]
    } else {
        &world_before[pref.pom.0].packets[pref.packet.0]
    }
}

fn const_size_of_field(world_before: &[Pom], pom: &Pom, my_id: PomId, field: &Field) -> Option<u32> {
    let elem = match field.field_type {
        TypeRef::Builtin(b) => b.byte_length(),
        TypeRef::Packet(pref) => {
            let p = get_packet(world_before, pom, my_id, pref);
            if !p.is_const_size() {
                return None;
            }
            p.min_size
        }
    };
    match &field.repeated_info {
        None => Some(elem),
        Some(r) => r.count.map(|c| elem * c),
    }
}

fn accumulate_from(world_before: &[Pom], pom: &Pom, my_id: PomId, packet: Option<&Packet>) -> (u32, Vec<FieldRef>) {
    let Some(packet) = packet else {
        return (0, Vec::new());
    };
    let parent = packet.parent.map(|pref| get_packet(world_before, pom, my_id, pref));
    let (mut c, mut intermediate) = accumulate_from(world_before, pom, my_id, parent);
    for (index, field) in packet.fields.iter().enumerate() {
        match const_size_of_field(world_before, pom, my_id, field) {
            Some(size) => c += size,
            None => intermediate.push(FieldRef { pom: packet.pom, packet: packet.id, field: crate::model::FieldId(index) }),
        }
    }
    (c, intermediate)
}

pub fn process_pom(world_before: &[Pom], pom: &mut Pom, my_id: PomId) -> Result<(), PacketError> {
    for idx in 0..pom.packets.len() {
        let parent = pom.packets[idx].parent.map(|pref| get_packet(world_before, pom, my_id, pref));
        let (mut c, mut intermediate) = accumulate_from(world_before, pom, my_id, parent);

        for field_idx in 0..pom.packets[idx].fields.len() {
            pom.packets[idx].fields[field_idx].offset = Some(Offset {
                constant_bytes: c,
                intermediate_fields: intermediate.clone(),
            });

            let field = &pom.packets[idx].fields[field_idx];
            match const_size_of_field(world_before, pom, my_id, field) {
                Some(size) => c += size,
                None => {
                    let fref = FieldRef { pom: my_id, packet: pom.packets[idx].id, field: crate::model::FieldId(field_idx) };
                    intermediate.push(fref);
                }
            }
        }
    }
    Ok(())
}
