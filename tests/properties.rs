use {
    proptest::prelude::*,
    storage_vec::DynamicArray,
};

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    Insert(usize, i32),
    Erase(usize),
    Pop,
    Resize(usize),
    Reserve(usize),
    Truncate(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(at, value)| Op::Insert(at, value)),
        2 => any::<usize>().prop_map(Op::Erase),
        1 => Just(Op::Pop),
        1 => (0usize..40).prop_map(Op::Resize),
        1 => (0usize..40).prop_map(Op::Reserve),
        1 => (0usize..40).prop_map(Op::Truncate),
    ]
}

proptest! {
    #[test]
    fn behaves_like_vec(ops in proptest::collection::vec(arb_op(), 0..64)) {
        let mut array = DynamicArray::new();
        let mut model = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    array.push_back(value).unwrap();
                    model.push(value);
                }
                Op::Insert(at, value) => {
                    let at = at % (model.len() + 1);
                    prop_assert_eq!(*array.insert(at, value).unwrap(), value);
                    model.insert(at, value);
                }
                Op::Erase(at) if !model.is_empty() => {
                    let at = at % model.len();
                    prop_assert_eq!(array.erase(at), at);
                    model.remove(at);
                }
                Op::Erase(_) => {}
                Op::Pop => prop_assert_eq!(array.pop_back(), model.pop()),
                Op::Resize(len) => {
                    array.resize(len).unwrap();
                    model.resize(len, 0);
                }
                Op::Reserve(capacity) => {
                    let before = array.capacity();
                    array.reserve(capacity).unwrap();
                    prop_assert_eq!(array.capacity(), before.max(capacity));
                }
                Op::Truncate(len) => {
                    array.truncate(len);
                    model.truncate(len);
                }
            }
            prop_assert_eq!(&array[..], &model[..]);
            prop_assert!(array.len() <= array.capacity());
        }
    }

    #[test]
    fn pushes_keep_order(values in proptest::collection::vec(any::<u16>(), 0..200)) {
        let mut array = DynamicArray::new();
        for &value in &values {
            array.push_back(value).unwrap();
        }
        prop_assert_eq!(array.len(), values.len());
        prop_assert_eq!(&array[..], &values[..]);
        let doubled = if values.is_empty() { 0 } else { values.len().next_power_of_two() };
        prop_assert_eq!(array.capacity(), doubled);
    }

    #[test]
    fn clones_do_not_alias(
        values in proptest::collection::vec(any::<i8>(), 1..32),
        at in any::<usize>(),
    ) {
        let original: DynamicArray<i8> = values.iter().copied().collect();
        let mut copy = original.clone();
        let at = at % values.len();
        copy[at] = copy[at].wrapping_add(1);
        copy.push_back(0).unwrap();
        prop_assert_eq!(&original[..], &values[..]);

        let mut assigned = DynamicArray::new();
        assigned.clone_from(&original);
        assigned.erase(at);
        prop_assert_eq!(&original[..], &values[..]);
    }

    #[test]
    fn insert_places_value(
        values in proptest::collection::vec(any::<i32>(), 0..32),
        at in any::<usize>(),
        value in any::<i32>(),
    ) {
        let mut array: DynamicArray<i32> = values.iter().copied().collect();
        let at = at % (values.len() + 1);
        array.insert(at, value).unwrap();
        prop_assert_eq!(array.len(), values.len() + 1);
        prop_assert_eq!(array[at], value);
        prop_assert_eq!(&array[..at], &values[..at]);
        prop_assert_eq!(&array[at + 1..], &values[at..]);
    }
}
