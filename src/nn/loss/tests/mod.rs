mod am_softmax;
mod local_push;
