mod diagram;
mod weights;
