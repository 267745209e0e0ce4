pub fn cerr<Int: Copy + TryInto<libc::c_long>>(res: Int) -> std::io::Result<Int> {
    match res.try_into() {
        Ok(-1) => Err(std::io::Error::last_os_error()),
        _ => Ok(res),
    }
}

#[cfg(test)]
mod tests {
    use super::cerr;

    #[test]
    fn minus_one_becomes_the_last_os_error() {
        assert!(cerr(0).is_ok());
        assert!(cerr(42).is_ok());

        let ret = unsafe { libc::close(-1) };
        assert!(cerr(ret).is_err());
    }
}
