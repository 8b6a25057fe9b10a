use super::*;

fn test_dims() -> MapDimensions {
  MapDimensions {
    min_x: -8.0,
    min_y: -8.0,
    min_z: 0.0,
    size_x: 16.0,
    size_y: 16.0,
    size_z: 100.0,
  }
}

#[test]
fn test_map_dimensions_extents() {
  let dims = test_dims();
  assert_eq!(dims.max_x(), 8.0);
  assert_eq!(dims.max_y(), 8.0);
  assert_eq!(dims.max_z(), 100.0);
}

#[test]
fn test_world_z_quantization() {
  let dims = test_dims();
  assert_eq!(dims.world_z(0), 0.0, "raw 0 maps to the bottom of the range");
  assert_eq!(
    dims.world_z(65535),
    100.0,
    "raw 65535 maps to the top of the range"
  );

  let mid = dims.world_z(32768);
  assert!((mid - 50.0).abs() < 0.01, "midpoint should be near 50, got {}", mid);
}

#[test]
fn test_validate_accepts_reasonable_config() {
  let config = QuadTreeConfig {
    leaf_node_size: 8,
    lod_level_count: 5,
    map_dims: test_dims(),
  };
  assert_eq!(config.validate(1024, 512), Ok(()));
}

#[test]
fn test_validate_rejects_undersized_raster() {
  let config = QuadTreeConfig::default();
  assert_eq!(
    config.validate(1, 512),
    Err(CreateError::RasterTooSmall {
      size_x: 1,
      size_y: 512
    })
  );
  assert_eq!(
    config.validate(512, 0),
    Err(CreateError::RasterTooSmall {
      size_x: 512,
      size_y: 0
    })
  );
  assert_eq!(config.validate(2, 2), Ok(()), "2x2 is the smallest valid raster");
}

#[test]
fn test_validate_rejects_oversized_raster() {
  let config = QuadTreeConfig::default();
  assert_eq!(
    config.validate(70000, 512),
    Err(CreateError::RasterTooLarge {
      size_x: 70000,
      size_y: 512
    })
  );
  assert_eq!(
    config.validate(512, 65536),
    Err(CreateError::RasterTooLarge {
      size_x: 512,
      size_y: 65536
    })
  );
  assert_eq!(config.validate(65535, 65535), Ok(()), "65535 is still valid");
}

#[test]
fn test_validate_rejects_bad_lod_level_count() {
  let mut config = QuadTreeConfig::default();

  config.lod_level_count = 0;
  assert_eq!(config.validate(64, 64), Err(CreateError::InvalidLodLevelCount(0)));

  config.lod_level_count = MAX_LOD_LEVELS + 1;
  assert_eq!(
    config.validate(64, 64),
    Err(CreateError::InvalidLodLevelCount(MAX_LOD_LEVELS + 1))
  );
}

#[test]
fn test_validate_rejects_oversized_top_nodes() {
  let mut config = QuadTreeConfig::default();

  // 8 << 15 = 262144 raster units per top node
  config.lod_level_count = MAX_LOD_LEVELS;
  assert_eq!(
    config.validate(64, 64),
    Err(CreateError::TopNodeTooLarge(262144))
  );

  // 2 << 14 = 32768 is the deepest tree 16-bit node sizes allow
  config.leaf_node_size = 2;
  config.lod_level_count = 15;
  assert_eq!(config.validate(64, 64), Ok(()));

  config.lod_level_count = 16;
  assert_eq!(config.validate(64, 64), Err(CreateError::TopNodeTooLarge(65536)));
}

#[test]
fn test_validate_rejects_bad_leaf_node_size() {
  let mut config = QuadTreeConfig::default();

  config.leaf_node_size = 0;
  assert!(config.validate(64, 64).is_err());

  config.leaf_node_size = 1;
  assert_eq!(config.validate(64, 64), Err(CreateError::InvalidLeafNodeSize(1)));

  config.leaf_node_size = 6;
  assert_eq!(config.validate(64, 64), Err(CreateError::InvalidLeafNodeSize(6)));

  config.leaf_node_size = 4;
  assert_eq!(config.validate(64, 64), Ok(()));
}

#[test]
fn test_top_node_size() {
  let config = QuadTreeConfig {
    leaf_node_size: 2,
    lod_level_count: 2,
    map_dims: test_dims(),
  };
  assert_eq!(config.top_node_size(), 4);

  let config = QuadTreeConfig {
    leaf_node_size: 8,
    lod_level_count: 5,
    map_dims: test_dims(),
  };
  assert_eq!(config.top_node_size(), 128);
}

#[test]
fn test_error_messages_name_the_offender() {
  let err = CreateError::InvalidLeafNodeSize(6);
  assert!(err.to_string().contains('6'));

  let err = CreateError::RasterTooLarge {
    size_x: 70000,
    size_y: 512,
  };
  assert!(err.to_string().contains("70000"));
}
