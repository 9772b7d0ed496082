//! Endianness pass (spec §4.4.3): `big_endian` is monotone down the
//! inheritance chain. Cheapest pass, runs last so emitters see a fully
//! decorated model.

use crate::error::PacketError;
use crate::model::{Packet, PacketRef, Pom, PomId};

fn get_packet<'a>(world_before: &'a [Pom], pom: &'a Pom, my_id: PomId, pref: PacketRef) -> &'a Packet {
    if pref.pom == my_id {
        &pom.packets[pref.packet.0]
    } else {
        &world_before[pref.pom.0].packets[pref.packet.0]
    }
}

fn ancestor_is_big_endian(world_before: &[Pom], pom: &Pom, my_id: PomId, packet: &Packet) -> bool {
    match packet.parent {
        None => false,
        Some(pref) => {
            let parent = get_packet(world_before, pom, my_id, pref);
            parent.big_endian || ancestor_is_big_endian(world_before, pom, my_id, parent)
        }
    }
}

pub fn process_pom(world_before: &[Pom], pom: &mut Pom, my_id: PomId) -> Result<(), PacketError> {
    for idx in 0..pom.packets.len() {
        if !pom.packets[idx].big_endian && ancestor_is_big_endian(world_before, pom, my_id, &pom.packets[idx]) {
            pom.packets[idx].big_endian = true;
        }
    }
    Ok(())
}
