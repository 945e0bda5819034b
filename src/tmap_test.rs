use arbitrary::{self, unstructured::Unstructured, Arbitrary};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;

use std::collections::BTreeMap;

#[test]
fn test_tmap() {
    let seed: u64 = random();
    // let seed: u64 = 5190152727843012233;
    println!("test_tmap {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: TreeMap<u8, u64> = TreeMap::new();
    let mut btmap: BTreeMap<u8, u64> = BTreeMap::new();

    let mut counts = [0_usize; 14];

    for _i in 0..200_000 {
        let bytes = rng.gen::<[u8; 32]>();
        let mut uns = Unstructured::new(&bytes);

        let op: Op<u8, u64> = uns.arbitrary().unwrap();
        // println!("op -- {:?}", op);
        match op {
            Op::Len => {
                counts[0] += 1;
                assert_eq!(index.len(), btmap.len());
            }
            Op::IsEmpty => {
                counts[1] += 1;
                assert_eq!(index.is_empty(), btmap.is_empty());
            }
            Op::Set(key, val) => {
                counts[2] += 1;
                assert_eq!(index.set(key, val), btmap.insert(key, val), "for key {}", key);
                index.validate().unwrap();
            }
            Op::InsertOrAssign(key, val) => {
                counts[3] += 1;
                btmap.insert(key, val);
                let value = index.insert_or_assign(key, val);
                assert_eq!(*value, val, "for key {}", key);
                index.validate().unwrap();
            }
            Op::Remove(key) => {
                counts[4] += 1;
                match (index.remove(&key), btmap.remove(&key)) {
                    (Err(err), None) => assert!(err.is_key_not_found(), "{}", err),
                    (Ok(v), Some(r)) => assert_eq!(v, r, "for key {}", key),
                    (Err(err), Some(_)) => panic!("remove key {} in tmap {}", key, err),
                    (Ok(_), None) => panic!("remove no key {} in btree", key),
                }
                index.validate().unwrap();
            }
            Op::RemoveAt(key) => {
                counts[5] += 1;
                let cur = index.find(&key);
                match (index.remove_at(cur), btmap.remove(&key)) {
                    (Err(err), None) => assert!(err.is_invalid_iterator(), "{}", err),
                    (Ok((k, v)), Some(r)) => assert_eq!((k, v), (key, r)),
                    (Err(err), Some(_)) => panic!("remove_at key {} in tmap {}", key, err),
                    (Ok(_), None) => panic!("remove_at no key {} in btree", key),
                }
                index.validate().unwrap();
            }
            Op::Validate => {
                counts[6] += 1;
                index.validate().unwrap();
            }
            Op::Get(key) => {
                counts[7] += 1;
                match (index.get(&key), btmap.get(&key)) {
                    (Ok(v), Some(r)) => assert_eq!(v, r, "for key {}", key),
                    (Err(err), None) if btmap.is_empty() => {
                        assert!(err.is_empty_container(), "{}", err)
                    }
                    (Err(err), None) => assert!(err.is_key_not_found(), "{}", err),
                    (Err(err), Some(_)) => panic!("get key {} in tmap {}", key, err),
                    (Ok(_), None) => panic!("get no key {} in btree", key),
                }
                assert_eq!(index.contains_key(&key), btmap.contains_key(&key));
            }
            Op::GetOrInsertDefault(key) => {
                counts[8] += 1;
                let value = *index.get_or_insert_default(key);
                assert_eq!(value, *btmap.entry(key).or_default());
                index.validate().unwrap();
            }
            Op::Iter => {
                counts[9] += 1;
                let a: Vec<(u8, u64)> = index.iter().map(|(k, v)| (*k, *v)).collect();
                let b: Vec<(u8, u64)> = btmap.iter().map(|(k, v)| (*k, *v)).collect();
                assert_eq!(a, b);
            }
            Op::Reverse => {
                counts[10] += 1;
                let a: Vec<(u8, u64)> = index.iter().rev().map(|(k, v)| (*k, *v)).collect();
                let b: Vec<(u8, u64)> = btmap.iter().rev().map(|(k, v)| (*k, *v)).collect();
                assert_eq!(a, b);
            }
            Op::Extend(items) => {
                counts[11] += 1;
                index.extend(items.clone());
                btmap.extend(items.clone());
                index.validate().unwrap();
            }
            Op::First => {
                counts[12] += 1;
                assert_eq!(index.first_key_value(), btmap.iter().next());
            }
            Op::Last => {
                counts[13] += 1;
                assert_eq!(index.last_key_value(), btmap.iter().next_back());
            }
        }
    }

    let a: Vec<(u8, u64)> = index.iter().map(|(k, v)| (*k, *v)).collect();
    let b: Vec<(u8, u64)> = btmap.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(a, b);

    println!("counts {:?} len:{}/{}", counts, index.len(), btmap.len());
}

#[test]
fn test_tmap_sizes() {
    let seed: u64 = random();
    println!("test_tmap_sizes {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    for n in [0_usize, 1, 2, 3, 10, 100, 1_000, 10_000].iter() {
        let mut index: TreeMap<u32, u32> = TreeMap::new();
        let mut btmap: BTreeMap<u32, u32> = BTreeMap::new();

        for i in 0..*n {
            let (key, val) = (rng.gen::<u32>() % 20_000, rng.gen::<u32>());
            index.set(key, val);
            btmap.insert(key, val);
            if i % 997 == 0 {
                index.validate().unwrap();
            }
        }
        index.validate().unwrap();
        assert_eq!(index.len(), btmap.len());
        assert!(index.iter().eq(btmap.iter()), "n:{}", n);
        assert!(index.iter().rev().eq(btmap.iter().rev()), "n:{}", n);

        let keys: Vec<u32> = btmap.keys().cloned().collect();
        for (i, key) in keys.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
            assert_eq!(index.remove(key).ok(), btmap.remove(key));
            if i % 499 == 0 {
                index.validate().unwrap();
            }
        }
        index.validate().unwrap();
        assert_eq!(index.len(), btmap.len());
        assert!(index.iter().eq(btmap.iter()), "n:{}", n);

        let keys: Vec<u32> = btmap.keys().cloned().collect();
        for key in keys.iter() {
            index.remove(key).unwrap();
        }
        index.validate().unwrap();
        assert!(index.is_empty());
        assert_eq!(index.iter().next(), None);
        assert_eq!(index.root, NIL);
    }
}

#[test]
fn test_tmap_scenario() {
    let mut index: TreeMap<i32, i32> = TreeMap::new();
    for key in [10, 20, 30, 15, 25, 5].iter() {
        index.set(*key, key * 10);
        index.validate().unwrap();
    }

    let keys: Vec<i32> = index.keys().cloned().collect();
    assert_eq!(keys, vec![5, 10, 15, 20, 25, 30]);
    assert!(index.slab[index.root].is_black());
    assert_eq!(index.entry_ref(index.root), (&20, &200));
    assert_eq!(index.black_height(), 2);

    assert_eq!(index.remove(&20).unwrap(), 200);
    index.validate().unwrap();
    let keys: Vec<i32> = index.keys().cloned().collect();
    assert_eq!(keys, vec![5, 10, 15, 25, 30]);
    assert_eq!(index.black_height(), 2);

    let err = index.remove(&99).unwrap_err();
    assert!(err.is_key_not_found(), "{}", err);
    assert_eq!(index.len(), 5);
    let keys: Vec<i32> = index.keys().cloned().collect();
    assert_eq!(keys, vec![5, 10, 15, 25, 30]);
    index.validate().unwrap();
}

#[test]
fn test_tmap_overwrite() {
    let mut index: TreeMap<&str, u32> = TreeMap::new();
    assert_eq!(index.set("a", 1), None);
    assert_eq!(index.set("b", 2), None);
    let slots = index.slab.capacity();

    assert_eq!(index.set("a", 10), Some(1));
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("a").unwrap(), &10);
    assert_eq!(index.slab.capacity(), slots);

    *index.insert_or_assign("b", 20) += 1;
    assert_eq!(index.get("b").unwrap(), &21);
    assert_eq!(index.len(), 2);

    *index.get_mut("b").unwrap() += 1;
    assert_eq!(index.get("b").unwrap(), &22);

    *index.get_or_insert_default("c") += 3;
    *index.get_or_insert_default("c") += 3;
    assert_eq!(index.get("c").unwrap(), &6);
    assert_eq!(index.len(), 3);
    index.validate().unwrap();
}

#[test]
fn test_tmap_strict_lookup() {
    let mut index: TreeMap<u32, u32> = TreeMap::new();
    assert!(index.get(&1).unwrap_err().is_empty_container());
    assert!(index.get_mut(&1).unwrap_err().is_empty_container());
    assert!(index.remove(&1).unwrap_err().is_key_not_found());
    assert!(!index.contains_key(&1));
    assert!(index.find(&1).is_end());

    index.set(1, 100);
    assert!(index.get(&2).unwrap_err().is_key_not_found());
    assert!(index.get_mut(&2).unwrap_err().is_key_not_found());
    assert!(index.contains_key(&1));
    assert!(!index.find(&1).is_end());

    assert_eq!(index.remove(&1).unwrap(), 100);
    assert!(index.is_empty());
    assert_eq!(index.root, NIL);
    assert_eq!(index.last_index(), NIL);
    index.validate().unwrap();
}

#[test]
fn test_tmap_slot_reuse() {
    let mut index: TreeMap<u32, u32> = TreeMap::new();
    for key in 0..100 {
        index.set(key, key);
    }
    let slots = index.slab.capacity();
    for key in 0..50 {
        index.remove(&key).unwrap();
    }
    for key in 100..150 {
        index.set(key, key);
    }
    assert_eq!(index.slab.capacity(), slots);
    index.validate().unwrap();
}

#[test]
fn test_tmap_equality() {
    let a: TreeMap<u32, u32> = (0..100).map(|i| (i, i * 2)).collect();
    let b: TreeMap<u32, u32> = (0..100).rev().map(|i| (i, i * 2)).collect();
    assert!(a == b);
    assert_eq!(a.clone(), b);

    let mut c = b.clone();
    c.set(50, 0);
    assert!(a != c);

    c.remove(&50).unwrap();
    assert!(a != c);
    c.set(50, 100);
    assert!(a == c);

    let empty1: TreeMap<u32, u32> = TreeMap::new();
    let empty2: TreeMap<u32, u32> = TreeMap::default();
    assert_eq!(empty1, empty2);
    assert!(empty1 != a);
}

#[test]
fn test_tmap_bulk_load() {
    let index = TreeMap::from([(3, "c"), (1, "a"), (2, "b"), (1, "z")]);
    assert_eq!(index.len(), 3);
    assert_eq!(index.get(&1).unwrap(), &"z");
    let items: Vec<(i32, &str)> = index.into_iter().collect();
    assert_eq!(items, vec![(1, "z"), (2, "b"), (3, "c")]);

    let index: TreeMap<u32, u32> = (0..10).map(|i| (i % 5, i)).collect();
    assert_eq!(index.len(), 5);
    let values: Vec<u32> = index.values().cloned().collect();
    assert_eq!(values, vec![5, 6, 7, 8, 9]);
    index.validate().unwrap();
}

#[test]
fn test_tmap_into_iter() {
    let index: TreeMap<u32, String> = (0..20).map(|i| (i, i.to_string())).collect();

    let mut iter = index.clone().into_iter();
    assert_eq!(iter.len(), 20);
    assert_eq!(iter.next(), Some((0, "0".to_string())));
    assert_eq!(iter.next_back(), Some((19, "19".to_string())));
    assert_eq!(iter.len(), 18);
    let rest: Vec<u32> = iter.map(|(k, _)| k).collect();
    assert_eq!(rest, (1..19).collect::<Vec<u32>>());

    // partially consumed iterator drops remaining entries.
    let mut iter = index.into_iter().rev();
    assert_eq!(iter.next(), Some((19, "19".to_string())));
    drop(iter);
}

#[test]
fn test_tmap_clear() {
    let mut index: TreeMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.iter().count(), 0);
    assert_eq!(index.first_key_value(), None);
    assert_eq!(index.last_key_value(), None);
    index.validate().unwrap();

    index.extend((0..10).map(|i| (i, i)));
    assert_eq!(index.len(), 10);
    assert_eq!(index.last_key_value(), Some((&9, &9)));
    index.validate().unwrap();
}

#[test]
fn test_tmap_debug() {
    let index = TreeMap::from([(2, 20), (1, 10)]);
    assert_eq!(format!("{:?}", index), "{1: 10, 2: 20}");
}

#[test]
fn test_tmap_validate_catches() {
    let mut index: TreeMap<u32, u32> = (0..10).map(|i| (i, i)).collect();
    index.validate().unwrap();

    let root = index.root;
    index.slab[root].set_red();
    assert!(index.validate().is_err());
    index.slab[root].set_black();
    index.validate().unwrap();

    let left = index.slab[root].left;
    index.slab[left].parent = NIL;
    assert!(index.validate().is_err());
    index.slab[left].parent = root;
    index.validate().unwrap();

    index.n_count += 1;
    assert!(index.validate().is_err());
    index.n_count -= 1;
    index.validate().unwrap();
}

#[derive(Debug, Arbitrary)]
enum Op<K, V> {
    Len,
    IsEmpty,
    Set(K, V),
    InsertOrAssign(K, V),
    Remove(K),
    RemoveAt(K),
    Validate,
    Get(K),
    GetOrInsertDefault(K),
    Iter,
    Reverse,
    Extend(Vec<(K, V)>),
    First,
    Last,
}
