use crate::utils::{group_in_order, MapIfOk};

#[test]
fn map_if_ok() {
    let ok: Result<Vec<i32>, String> = vec![1, 2, 3].map_if_ok(|x| Ok(x * 2));
    assert_eq!(ok, Ok(vec![2, 4, 6]));

    let err: Result<Vec<i32>, String> = vec![1, 2, 3].map_if_ok(|x| {
        if x == 2 {
            Err(format!("bad {}", x))
        } else {
            Ok(x)
        }
    });
    assert_eq!(err, Err("bad 2".to_string()));
}

#[test]
fn group_in_order_keeps_first_appearance() {
    let items = vec![("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)];
    let groups = group_in_order(items, |item| item.0);
    assert_eq!(
        groups,
        vec![
            ("b", vec![("b", 1), ("b", 3)]),
            ("a", vec![("a", 2), ("a", 5)]),
            ("c", vec![("c", 4)]),
        ]
    );
}

#[test]
fn group_in_order_empty() {
    let groups = group_in_order(Vec::<u32>::new(), |x| *x);
    assert!(groups.is_empty());
}

#[test]
fn group_in_order_owned_keys() {
    let names = vec!["lib_a_get", "lib_b_set", "lib_a_set", "lib_c", "lib_b_get"];
    let groups = group_in_order(names, |name| name[..5].to_string());
    let keys: Vec<&str> = groups.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["lib_a", "lib_b", "lib_c"]);
    assert_eq!(groups[0].1, vec!["lib_a_get", "lib_a_set"]);
    assert_eq!(groups[1].1, vec!["lib_b_set", "lib_b_get"]);
    assert_eq!(groups[2].1, vec!["lib_c"]);
}
