pub fn align<T>(addr: T, alignment: T) -> T
where
    T: num_traits::int::PrimInt + num_traits::WrappingAdd,
{
    if alignment.is_zero() {
        return addr;
    }
    let rem = addr % alignment;
    if !rem.is_zero() {
        addr.wrapping_add(&(alignment - rem))
    } else {
        addr
    }
}
