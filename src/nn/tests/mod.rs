mod context;
mod layer_angle_linear;
mod layer_avg_pool3d;
mod sphere;
