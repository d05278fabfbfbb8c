use super::*;

fn ids(ns: &[u32]) -> Vec<Identifier> {
    ns.iter().map(|n| Identifier::new(*n).unwrap()).collect()
}

#[test]
fn chain_ids_must_be_one_to_four_distinct() {
    assert!(validate_chain_ids(&ids(&[1])).is_ok());
    assert!(validate_chain_ids(&ids(&[16, 2, 9, 4])).is_ok());
    assert!(matches!(
        validate_chain_ids(&[]),
        Err(IdMaskError::Validation(_))
    ));
    assert!(validate_chain_ids(&ids(&[1, 2, 3, 4, 5])).is_err());
    assert!(validate_chain_ids(&ids(&[3, 7, 3])).is_err());
}

#[test]
fn names_keep_caller_order() {
    let mat = MaterialId::new("Car.Paint").unwrap();
    assert_eq!(
        chain_graph_name("ID_Mix_Color_", &mat, &ids(&[12, 2])),
        "ID_Mix_Color_Car_Paint_12_02"
    );
    assert_eq!(
        chain_label(ChainKind::Normal, &ids(&[12, 2])),
        "ID Mix Normal (12, 2)"
    );
    assert_eq!(chain_color_socket(ids(&[3])[0]), "Color_ID03");
    assert_eq!(chain_mask_socket(ids(&[10])[0]), "Mask_ID10");
}

#[test]
fn handles_display_their_number() {
    assert_eq!(ChainHandle(7).to_string(), "chain#7");
}
