use std::sync::Arc;

use gridstore::array::{DataType, Extent};
use gridstore::dataset::{Dataset, DatasetBuilder, DatasetLayout};
use gridstore::group::Group;
use gridstore::storage::store::{FilesystemStore, MemoryStore};
use gridstore::storage::{data_key, ReadableStorageTraits};

#[test]
fn write_read_chunked_dataset() {
    let store = Arc::new(MemoryStore::new());
    let dataset = DatasetBuilder::new(vec![100, 100], DataType::Float32)
        .chunked()
        .deflate(5)
        .shuffle()
        .build(store.clone(), "/group/dataset")
        .unwrap();
    dataset.store_metadata().unwrap();

    let elements: Vec<f32> = (0..100 * 100).map(|i| i as f32).collect();
    dataset.write(&elements).unwrap();

    let opened = Dataset::open(store, "/group/dataset").unwrap();
    assert!(matches!(opened.layout(), DatasetLayout::Chunked { .. }));
    assert_eq!(opened.filters().len(), 2);
    assert_eq!(opened.read::<Vec<f32>>().unwrap(), elements);
}

#[test]
fn write_read_scalar_and_fixed_array() {
    let store = Arc::new(MemoryStore::new());

    let scalar = DatasetBuilder::new(vec![], DataType::Float64)
        .build(store.clone(), "/scalar")
        .unwrap();
    scalar.store_metadata().unwrap();
    scalar.write(&3.25f64).unwrap();
    assert_eq!(scalar.read::<f64>().unwrap(), 3.25);

    let fixed = DatasetBuilder::new(vec![4], DataType::Int32)
        .build(store, "/fixed")
        .unwrap();
    fixed.store_metadata().unwrap();
    fixed.write(&[1i32, 2, 3, 4]).unwrap();
    assert_eq!(fixed.read::<[i32; 4]>().unwrap(), [1, 2, 3, 4]);
    // A fixed capacity value of the wrong length is rejected, never truncated or padded
    assert!(fixed.read::<[i32; 5]>().is_err());
}

#[test]
fn write_read_string() {
    let store = Arc::new(MemoryStore::new());
    let text = "temperature".to_string();
    let dataset = DatasetBuilder::new(vec![], DataType::FixedString(text.len()))
        .build(store, "/label")
        .unwrap();
    dataset.store_metadata().unwrap();
    dataset.write(&text).unwrap();
    assert_eq!(dataset.read::<String>().unwrap(), text);

    // A string of another length has another data type
    assert!(dataset.write(&"?".to_string()).is_err());
}

#[test]
fn bool_translation_on_disk() {
    let store = Arc::new(MemoryStore::new());
    let booleans = vec![true, false, false, true];
    let integers = vec![1u8, 0, 0, 1];

    let from_bools = DatasetBuilder::new(vec![4], DataType::UInt8)
        .build(store.clone(), "/bools")
        .unwrap();
    from_bools.store_metadata().unwrap();
    from_bools.write(&booleans).unwrap();

    let from_ints = DatasetBuilder::new(vec![4], DataType::UInt8)
        .build(store.clone(), "/ints")
        .unwrap();
    from_ints.store_metadata().unwrap();
    from_ints.write(&integers).unwrap();

    // Identical on-disk bit patterns for booleans and same-width integers
    let bool_bytes = store
        .get(&data_key(from_bools.path()))
        .unwrap()
        .unwrap();
    let int_bytes = store.get(&data_key(from_ints.path())).unwrap().unwrap();
    assert_eq!(bool_bytes, int_bytes);

    // The integer-typed region reads back into a boolean-bound type exactly
    assert_eq!(from_ints.read::<Vec<bool>>().unwrap(), booleans);
    assert_eq!(from_bools.read::<Vec<u8>>().unwrap(), integers);

    // A stored byte that is not 0 or 1 fails a checked boolean read
    let corrupt = DatasetBuilder::new(vec![1], DataType::UInt8)
        .build(store, "/corrupt")
        .unwrap();
    corrupt.store_metadata().unwrap();
    corrupt.write(&vec![2u8]).unwrap();
    assert!(corrupt.read::<Vec<bool>>().is_err());
}

#[cfg(feature = "ndarray")]
#[test]
fn write_read_ndarray() {
    let store = Arc::new(MemoryStore::new());
    let array = ndarray::Array2::<f64>::from_shape_fn((20, 30), |(j, i)| (j * 30 + i) as f64);
    let dataset = DatasetBuilder::new(vec![20, 30], DataType::Float64)
        .chunk_shape(vec![10u64, 30].try_into().unwrap())
        .build(store, "/array")
        .unwrap();
    dataset.store_metadata().unwrap();
    dataset.write(&array).unwrap();
    assert_eq!(dataset.read::<ndarray::Array2<f64>>().unwrap(), array);
    // The flattened elements are also retrievable
    assert_eq!(
        dataset.read::<Vec<f64>>().unwrap(),
        array.iter().copied().collect::<Vec<_>>()
    );
}

#[test]
fn resize_and_append_rows() {
    let store = Arc::new(MemoryStore::new());
    let mut dataset = DatasetBuilder::new(vec![1, 3], DataType::UInt16)
        .max_shape(vec![Extent::Unlimited, Extent::Fixed(3)])
        .chunk_shape(vec![1u64, 3].try_into().unwrap())
        .build(store, "/rows")
        .unwrap();
    dataset.store_metadata().unwrap();
    dataset.write(&vec![1u16, 2, 3]).unwrap();

    dataset.resize(vec![3, 3]).unwrap();
    let mut rows = dataset.read::<Vec<u16>>().unwrap();
    assert_eq!(rows, vec![1, 2, 3, 0, 0, 0, 0, 0, 0]);

    rows[3..].copy_from_slice(&[4, 5, 6, 7, 8, 9]);
    dataset.write(&rows).unwrap();
    assert_eq!(
        dataset.read::<Vec<u16>>().unwrap(),
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9]
    );
}

#[test]
fn hierarchy_roundtrip_filesystem() {
    let base_directory = tempfile::TempDir::new().unwrap();
    let store = Arc::new(FilesystemStore::new(base_directory.path()).unwrap());

    let mut group = Group::open(store.clone(), "/experiment").unwrap();
    group
        .attributes_mut()
        .insert("run".to_string(), 7.into());
    group.store_metadata().unwrap();

    let dataset = DatasetBuilder::new(vec![2, 2], DataType::Int64)
        .chunked()
        .build(store.clone(), "/experiment/counts")
        .unwrap();
    dataset.store_metadata().unwrap();
    dataset.write(&vec![1i64, 2, 3, 4]).unwrap();

    // Reopen everything from the files on disk
    let store = Arc::new(FilesystemStore::new(base_directory.path()).unwrap());
    let group = Group::open(store.clone(), "/experiment").unwrap();
    assert_eq!(group.attributes().get("run"), Some(&7.into()));
    assert_eq!(
        group.children().unwrap(),
        vec!["/experiment/counts".try_into().unwrap()]
    );

    let dataset = Dataset::open(store, "/experiment/counts").unwrap();
    assert_eq!(dataset.shape(), &[2, 2]);
    assert_eq!(dataset.read::<Vec<i64>>().unwrap(), vec![1, 2, 3, 4]);
}
