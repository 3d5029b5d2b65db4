mod limit_shape;
