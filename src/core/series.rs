mod bucket;

pub use self::bucket::Bucket;
