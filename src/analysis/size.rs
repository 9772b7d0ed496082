//! Size pass (spec §4.4.1): per-packet `min_size` and `size_info`
//! finalization, plus repeated-field validation.

use crate::error::{Location, PacketError};
use crate::model::packet::SizeDetail;
use crate::model::{Packet, PacketRef, Pom, PomId, TypeRef};

fn get_packet<'a>(world_before: &'a [Pom], pom: &'a Pom, my_id: PomId, pref: PacketRef) -> &'a Packet {
    if pref.pom == my_id {
        &pom.packets[pref.packet.0]
    } else {
        &world_before[pref.pom.0].packets[pref.packet.0]
    }
}

fn const_size_of(world_before: &[Pom], pom: &Pom, my_id: PomId, ty: TypeRef) -> Option<u32> {
    match ty {
        TypeRef::Builtin(b) => Some(b.byte_length()),
        TypeRef::Packet(pref) => {
            let p = get_packet(world_before, pom, my_id, pref);
            if p.is_const_size() {
                Some(p.min_size)
            } else {
                None
            }
        }
    }
}

fn is_const_size_packet(world_before: &[Pom], pom: &Pom, my_id: PomId, packet: &Packet) -> bool {
    // Only an explicit (or, when recursing into an already-finalized
    // ancestor, inherited) size field disqualifies a packet here — matching
    // the original's `get_size_field()` check, which is blank for a
    // Constant/Custom detail and truthy only for a real size field.
    // `size_info.is_some()` alone would also be true for an already-finalized
    // *constant*-size ancestor, wrongly treating every packet with a parent
    // as non-const-size.
    if matches!(packet.size_info, Some(SizeDetail::SizeField(_))) {
        return false;
    }
    if packet.annotation("custom_size").is_some() {
        return false;
    }
    if let Some(pref) = packet.parent {
        let parent = get_packet(world_before, pom, my_id, pref);
        if !is_const_size_packet(world_before, pom, my_id, parent) {
            return false;
        }
    }
    for f in &packet.fields {
        if f.is_dynamic_repeated() || const_size_of(world_before, pom, my_id, f.field_type).is_none() {
            return false;
        }
    }
    true
}

fn min_size_of(world_before: &[Pom], pom: &Pom, my_id: PomId, packet: &Packet) -> u32 {
    let mut m = match packet.parent {
        Some(pref) => get_packet(world_before, pom, my_id, pref).min_size,
        None => 0,
    };
    for f in &packet.fields {
        let Some(elem_size) = const_size_of(world_before, pom, my_id, f.field_type) else {
            continue;
        };
        if f.is_dynamic_repeated() {
            continue;
        }
        let count = f.repeated_info.as_ref().and_then(|r| r.count).unwrap_or(1);
        m += elem_size * count;
    }
    m
}

fn finalize_size_info(
    world_before: &[Pom],
    pom: &mut Pom,
    my_id: PomId,
    idx: usize,
) -> Result<(), PacketError> {
    let loc = Location::packet(pom.path.clone(), pom.packets[idx].name.clone());

    if pom.packets[idx].size_info.is_some() {
        if let Some(pref) = pom.packets[idx].parent {
            let parent = get_packet(world_before, pom, my_id, pref);
            if let Some(SizeDetail::SizeField(parent_field)) = parent.size_info {
                let own_field = pom.packets[idx].own_size_field().expect("size_info is SizeField");
                if own_field != parent_field {
                    return Err(PacketError::LayoutError {
                        location: loc,
                        message: format!(
                            "{} overrides its parent's size field with a different field",
                            pom.packets[idx].name
                        ),
                    });
                }
            }
        }
        return Ok(());
    }

    if is_const_size_packet(world_before, pom, my_id, &pom.packets[idx]) {
        let min_size = pom.packets[idx].min_size;
        if min_size == 0 {
            return Err(PacketError::LayoutError {
                location: loc,
                message: format!("const-size packet {} has a zero size", pom.packets[idx].name),
            });
        }
        pom.packets[idx].size_info = Some(SizeDetail::Constant(min_size));
        return Ok(());
    }

    if let Some(pref) = pom.packets[idx].parent {
        let parent = get_packet(world_before, pom, my_id, pref);
        if let Some(SizeDetail::SizeField(parent_field)) = parent.size_info {
            pom.packets[idx].size_info = Some(SizeDetail::SizeField(parent_field));
            return Ok(());
        }
    }

    // Neither const-size nor covered by a size field (own or inherited): the
    // packet's length is left for the generated runtime to compute, whether
    // or not `@custom_size` was written explicitly (the annotation only
    // forces a packet out of the const-size path in `is_const_size_packet`).
    pom.packets[idx].size_info = Some(SizeDetail::Custom);
    Ok(())
}

fn validate_repeated_fields(pom: &Pom, idx: usize) -> Result<(), PacketError> {
    let packet = &pom.packets[idx];
    let n = packet.fields.len();
    let mut implicit_seen = false;

    for (i, field) in packet.fields.iter().enumerate() {
        let is_implicit = field.repeated_info.as_ref().is_some_and(|r| r.is_implicit());
        if !is_implicit {
            continue;
        }
        let loc = Location::field(pom.path.clone(), packet.name.clone(), field.name.clone());
        if !packet.children.is_empty() {
            return Err(PacketError::LayoutError {
                location: loc,
                message: format!("{}.{} is implicitly-sized but the packet has child packets", packet.name, field.name),
            });
        }
        if i != n - 1 {
            return Err(PacketError::LayoutError {
                location: loc,
                message: format!("{}.{} is implicitly-sized but is not the last field", packet.name, field.name),
            });
        }
        if implicit_seen {
            return Err(PacketError::LayoutError {
                location: loc,
                message: format!("{} has more than one implicitly-sized field", packet.name),
            });
        }
        implicit_seen = true;
    }
    Ok(())
}

pub fn process_pom(world_before: &[Pom], pom: &mut Pom, my_id: PomId) -> Result<(), PacketError> {
    for idx in 0..pom.packets.len() {
        let m = min_size_of(world_before, pom, my_id, &pom.packets[idx]);
        pom.packets[idx].min_size = m;
    }
    for idx in 0..pom.packets.len() {
        finalize_size_info(world_before, pom, my_id, idx)?;
    }
    for idx in 0..pom.packets.len() {
        validate_repeated_fields(pom, idx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::model::packet::SizeDetail;
    use crate::test_support::analyze;

    /// S1 — const-size with inheritance.
    #[test]
    fn const_size_with_inheritance() {
        let world = analyze(
            r#"
            packet A {
              uint16 x;
              uint8 y;
            }
            packet B : A {
              uint32 z;
            }
            "#,
        )
        .unwrap();
        let pom = &world[0];
        let a = &pom.packets[pom.find_packet("A").unwrap().0];
        assert_eq!(a.min_size, 3);
        assert!(a.is_const_size());
        let b = &pom.packets[pom.find_packet("B").unwrap().0];
        assert_eq!(b.min_size, 7);
        assert!(b.is_const_size());
    }

    /// S3 — fixed-count array contributes `count * elem_size` to `min_size`
    /// and keeps the packet const-size.
    #[test]
    fn fixed_count_array_is_const_size() {
        let world = analyze(
            r#"
            packet V {
              uint32 a;
              @repeated(count=4) uint16 b;
              uint8 tail;
            }
            "#,
        )
        .unwrap();
        let pom = &world[0];
        let v = &pom.packets[pom.find_packet("V").unwrap().0];
        assert_eq!(v.min_size, 13);
        assert!(v.is_const_size());
    }

    /// S2 — an explicit `@size` field makes the packet dynamic even though
    /// every field is itself const-size.
    #[test]
    fn size_field_marks_packet_dynamic() {
        let world = analyze(
            r#"
            packet Pkt {
              uint16 len;
              @size uint16 sz;
              @repeated uint8 payload;
            }
            "#,
        )
        .unwrap();
        let pom = &world[0];
        let pkt = &pom.packets[pom.find_packet("Pkt").unwrap().0];
        assert_eq!(pkt.min_size, 4);
        assert!(matches!(pkt.size_info, Some(SizeDetail::SizeField(_))));
    }

    /// Invariant 2: min_size is monotone along inheritance.
    #[test]
    fn min_size_is_monotone_over_inheritance() {
        let world = analyze(
            r#"
            packet Base {
              uint32 a;
            }
            packet Mid : Base {
              uint16 b;
            }
            packet Leaf : Mid {
              uint8 c;
            }
            "#,
        )
        .unwrap();
        let pom = &world[0];
        let base = pom.packets[pom.find_packet("Base").unwrap().0].min_size;
        let mid = pom.packets[pom.find_packet("Mid").unwrap().0].min_size;
        let leaf = pom.packets[pom.find_packet("Leaf").unwrap().0].min_size;
        assert!(mid >= base);
        assert!(leaf >= mid);
    }

    /// S5 — an implicitly-sized array must be the packet's last field.
    #[test]
    fn non_last_implicit_array_is_rejected() {
        let err = analyze(
            r#"
            packet Bad {
              @repeated uint8 blob;
              uint8 crc;
            }
            "#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Bad"));
        assert!(message.contains("blob"));
    }

    /// Spec §3 invariant 4: two implicitly-sized fields in one packet is
    /// also rejected, independent of position.
    #[test]
    fn two_implicit_arrays_is_rejected() {
        let err = analyze(
            r#"
            packet Bad {
              @repeated uint8 first;
              @repeated uint8 second;
            }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Bad"));
    }

    /// Spec §3 invariant 2: a child overriding its parent's size field with
    /// a different field is a layout error.
    #[test]
    fn child_overriding_size_field_is_rejected() {
        let err = analyze(
            r#"
            packet Base {
              @size uint16 len;
              @repeated uint8 payload;
            }
            packet Child : Base {
              @size uint16 other_len;
            }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Child"));
    }

    /// A const-size packet computing a zero minimum size is rejected.
    #[test]
    fn zero_size_const_packet_is_rejected() {
        let err = analyze("packet Empty {}").unwrap_err();
        assert!(err.to_string().contains("Empty"));
    }
}
